// Copyright 2024 The Ledgertree Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The Merkle tree engine (spec.md §4.3): an immutable, content-addressed
//! tree whose leaves are object entries and whose interior nodes are tree
//! entries.
//!
//! `update` is grounded directly on jj-lib's `tree_builder.rs`: batch
//! writes are grouped by directory, ancestor directories are populated on
//! demand, and then directories are rewritten deepest-first by walking a
//! `BTreeMap` back to front — the same `pop_last` idiom `TreeBuilder`
//! uses — so a directory's freshly-written address can be folded into its
//! still-pending parent before the parent itself is rewritten.

use std::collections::BTreeMap;

use crate::error::{StoreError, StoreResult};
use crate::identity::{hash, Address};
use crate::model::{Entry, EntryType, Object, TreeNode, WorkspaceChange, WorkspaceEntry};
use crate::path::RepoPath;
use crate::store::{RepoReadOnlyOps, RepoReadWriteOps};

/// Walks `root` along `path` and reads the `Object` at its leaf.
///
/// Read-only (spec.md §4.2): callers resolve and read through
/// `Store::repo_read_only`, never `repo_read_write`.
pub fn get_object(
    txn: &mut dyn RepoReadOnlyOps,
    root: &Address,
    path: &str,
) -> StoreResult<Object> {
    let path = RepoPath::parse(path)?;
    let addr = resolve(txn, root, &path, EntryType::Object)?;
    txn.read_object(&addr)
}

/// Walks `root` along `path` and returns the address of the named entry,
/// failing if its type doesn't match `expected_type`.
pub fn get_address(
    txn: &mut dyn RepoReadOnlyOps,
    root: &Address,
    path: &str,
    expected_type: EntryType,
) -> StoreResult<Address> {
    let path = RepoPath::parse(path)?;
    resolve(txn, root, &path, expected_type)
}

fn resolve(
    txn: &mut dyn RepoReadOnlyOps,
    root: &Address,
    path: &RepoPath,
    expected_type: EntryType,
) -> StoreResult<Address> {
    if path.is_root() {
        return Err(StoreError::InvalidArgument(
            "cannot resolve the root path to an entry".to_string(),
        ));
    }
    let mut current = root.clone();
    let segments = path.segments();
    for (i, segment) in segments.iter().enumerate() {
        let node = txn.read_tree(&current)?;
        let entry = node.get(segment).ok_or(StoreError::NotFound)?;
        let is_last = i == segments.len() - 1;
        if is_last {
            if entry.entry_type != expected_type {
                return Err(StoreError::InvalidArgument(format!(
                    "entry {:?} is a {:?}, expected {:?}",
                    segment, entry.entry_type, expected_type
                )));
            }
            return Ok(entry.address.clone());
        }
        if entry.entry_type != EntryType::Tree {
            // Only the final component may name an OBJECT (spec.md §4.3).
            return Err(StoreError::NotFound);
        }
        current = entry.address.clone();
    }
    unreachable!("path is non-root, loop always returns")
}

/// Direct children of the tree at `addr`, in stored order.
pub fn list_tree(txn: &mut dyn RepoReadOnlyOps, addr: &Address) -> StoreResult<Vec<Entry>> {
    txn.list_tree(addr)
}

/// Folds a batch of workspace writes/tombstones into the tree rooted at
/// `root`, returning the address of the updated root.
///
/// Batch entries are grouped by parent directory; within a single batch,
/// multiple entries for the same `(directory, name)` are resolved
/// last-write-wins in batch order (spec.md §4.3 "Ordering and tie-breaks").
/// Unchanged subtrees are never re-read or re-written, giving structural
/// sharing for free: only directories on the path from a changed leaf to
/// the root are touched.
pub fn update(
    txn: &mut dyn RepoReadWriteOps,
    root: &Address,
    batch: &[WorkspaceEntry],
) -> StoreResult<Address> {
    if batch.is_empty() {
        return Ok(root.clone());
    }

    let mut nodes = load_ancestor_nodes(txn, root, batch)?;

    // Apply every batch entry to its parent directory's in-memory node.
    // `BTreeMap` iteration order is irrelevant here: last-write-wins is
    // enforced by processing the batch itself in order, not the map.
    for entry in batch {
        let path = RepoPath::parse(&entry.path)?;
        let (dir, basename) = path
            .split()
            .ok_or_else(|| StoreError::InvalidArgument("cannot write to the root".to_string()))?;
        let dir_key = dir.join("/");
        let node = nodes
            .get_mut(&dir_key)
            .expect("ancestor directories were pre-populated");
        match &entry.change {
            WorkspaceChange::Tombstone => node.remove(basename),
            WorkspaceChange::Write(addr) => node.set(Entry {
                name: basename.to_string(),
                entry_type: EntryType::Object,
                address: addr.clone(),
                metadata: Default::default(),
            }),
        }
    }

    // Rewrite directories deepest-first. `BTreeMap<String, _>` sorts keys
    // lexicographically, and a directory's key is always a proper prefix
    // of (and therefore sorts before, when non-empty) its descendants'
    // keys with one exception: a path and its child share no ordering
    // guarantee from string comparison alone, so instead we walk by
    // segment depth, deepest first.
    let mut dir_keys: Vec<String> = nodes.keys().cloned().collect();
    dir_keys.sort_by_key(|k| std::cmp::Reverse(depth(k)));

    for dir_key in dir_keys {
        let node = nodes.remove(&dir_key).expect("just listed this key");
        if dir_key.is_empty() {
            // Root: write it even if empty, and we're done.
            let addr = persist(txn, &node)?;
            return Ok(addr);
        }
        let (parent_key, basename) = split_dir_key(&dir_key);
        if node.is_empty() {
            let parent = nodes.get_mut(&parent_key).expect("parent was pre-populated");
            parent.remove(&basename);
        } else {
            let addr = persist(txn, &node)?;
            let parent = nodes.get_mut(&parent_key).expect("parent was pre-populated");
            parent.set(Entry {
                name: basename,
                entry_type: EntryType::Tree,
                address: addr,
                metadata: Default::default(),
            });
        }
    }

    unreachable!("the root directory (key \"\") is always present and returns above")
}

fn persist(txn: &mut dyn RepoReadWriteOps, node: &TreeNode) -> StoreResult<Address> {
    let addr = hash(node);
    txn.write_tree(&addr, node)?;
    Ok(addr)
}

fn depth(dir_key: &str) -> usize {
    if dir_key.is_empty() {
        0
    } else {
        dir_key.matches('/').count() + 1
    }
}

fn split_dir_key(dir_key: &str) -> (String, String) {
    match dir_key.rsplit_once('/') {
        Some((parent, basename)) => (parent.to_string(), basename.to_string()),
        None => (String::new(), dir_key.to_string()),
    }
}

/// Loads every directory node on the path from the root to each batch
/// entry's parent, keyed by the directory's `"/"`-joined segments (`""`
/// for the root). Directories not yet present in the stored tree start
/// empty, mirroring jj-lib's `TreeBuilder::get_base_trees`/`populate_trees`.
fn load_ancestor_nodes(
    txn: &mut dyn RepoReadWriteOps,
    root: &Address,
    batch: &[WorkspaceEntry],
) -> StoreResult<BTreeMap<String, TreeNode>> {
    let mut nodes: BTreeMap<String, TreeNode> = BTreeMap::new();
    nodes.insert(String::new(), txn.read_tree(root)?);

    for entry in batch {
        let path = RepoPath::parse(&entry.path)?;
        let (dir_segments, _basename) = path
            .split()
            .ok_or_else(|| StoreError::InvalidArgument("cannot write to the root".to_string()))?;

        let mut prefix = String::new();
        for segment in dir_segments {
            let parent_key = prefix.clone();
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            if nodes.contains_key(&prefix) {
                continue;
            }
            let parent = nodes.get(&parent_key).expect("parent populated by prior iteration");
            let child = match parent.get(segment) {
                Some(e) if e.entry_type == EntryType::Tree => txn.read_tree(&e.address)?,
                Some(_) => {
                    // A file sits where a directory is now being written
                    // through; the batch's write will replace it with a
                    // TREE entry once this directory is persisted.
                    TreeNode::default()
                }
                None => TreeNode::default(),
            };
            nodes.insert(prefix.clone(), child);
        }
    }

    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::store::Store;

    fn obj_addr(n: u8) -> Address {
        Address::from_bytes(&[n; 32])
    }

    #[test]
    fn update_empty_batch_is_noop() {
        let store = MemoryStore::new();
        let root = Address::empty_tree();
        let new_root = store
            .repo_read_write("c", "r", |txn| update(txn, &root, &[]))
            .unwrap();
        assert_eq!(new_root, root);
    }

    #[test]
    fn write_then_read_single_object() {
        let store = MemoryStore::new();
        let root = Address::empty_tree();
        let batch = vec![WorkspaceEntry::write("a/b.txt", obj_addr(1))];
        let new_root = store
            .repo_read_write("c", "r", |txn| update(txn, &root, &batch))
            .unwrap();
        let addr = store
            .repo_read_only("c", "r", |txn| {
                get_address(txn, &new_root, "a/b.txt", EntryType::Object)
            })
            .unwrap();
        assert_eq!(addr, obj_addr(1));
    }

    #[test]
    fn tombstone_removes_entry_and_empty_parent() {
        let store = MemoryStore::new();
        let root = Address::empty_tree();
        let write = vec![WorkspaceEntry::write("a/b.txt", obj_addr(1))];
        let after_write = store
            .repo_read_write("c", "r", |txn| update(txn, &root, &write))
            .unwrap();

        let delete = vec![WorkspaceEntry::tombstone("a/b.txt")];
        let after_delete = store
            .repo_read_write("c", "r", |txn| update(txn, &after_write, &delete))
            .unwrap();

        // The only entry under "a" was removed, so "a" itself disappears
        // and the tree collapses back to empty.
        assert_eq!(after_delete, Address::empty_tree());
    }

    #[test]
    fn unrelated_subtrees_are_structurally_shared() {
        let store = MemoryStore::new();
        let root = Address::empty_tree();
        let seed = vec![
            WorkspaceEntry::write("a/x", obj_addr(1)),
            WorkspaceEntry::write("b/y", obj_addr(2)),
        ];
        let root1 = store
            .repo_read_write("c", "r", |txn| update(txn, &root, &seed))
            .unwrap();
        let b_addr_1 = store
            .repo_read_only("c", "r", |txn| {
                get_address(txn, &root1, "b", EntryType::Tree)
            })
            .unwrap();

        let change_a = vec![WorkspaceEntry::write("a/x", obj_addr(3))];
        let root2 = store
            .repo_read_write("c", "r", |txn| update(txn, &root1, &change_a))
            .unwrap();
        let b_addr_2 = store
            .repo_read_only("c", "r", |txn| {
                get_address(txn, &root2, "b", EntryType::Tree)
            })
            .unwrap();

        assert_eq!(b_addr_1, b_addr_2, "untouched subtree must keep its address");
    }

    #[test]
    fn last_write_wins_within_a_batch() {
        let store = MemoryStore::new();
        let root = Address::empty_tree();
        let batch = vec![
            WorkspaceEntry::write("f", obj_addr(1)),
            WorkspaceEntry::write("f", obj_addr(2)),
        ];
        let new_root = store
            .repo_read_write("c", "r", |txn| update(txn, &root, &batch))
            .unwrap();
        let addr = store
            .repo_read_only("c", "r", |txn| {
                get_address(txn, &new_root, "f", EntryType::Object)
            })
            .unwrap();
        assert_eq!(addr, obj_addr(2));
    }

    #[test]
    fn list_tree_returns_direct_children_in_order() {
        let store = MemoryStore::new();
        let root = Address::empty_tree();
        let batch = vec![
            WorkspaceEntry::write("a/y", obj_addr(1)),
            WorkspaceEntry::write("a/x", obj_addr(2)),
            WorkspaceEntry::write("b/z", obj_addr(3)),
        ];
        let new_root = store
            .repo_read_write("c", "r", |txn| update(txn, &root, &batch))
            .unwrap();
        let a_addr = store
            .repo_read_only("c", "r", |txn| {
                get_address(txn, &new_root, "a", EntryType::Tree)
            })
            .unwrap();
        let entries = store
            .repo_read_only("c", "r", |txn| list_tree(txn, &a_addr))
            .unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
    }
}
