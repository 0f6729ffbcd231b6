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

//! Persistent entity schemas: `Repo`, `Branch`, `Commit`, `TreeNode`,
//! `Entry`, `Object`, `WorkspaceEntry`.
//!
//! Field order is the struct's declared order and maps are `BTreeMap`s, so
//! `identity::hash` of these types is stable across processes and versions
//! of this crate (see SPEC_FULL.md §3).

use std::collections::BTreeMap;

use crate::identity::{Address, ContentHash};

/// Identifies a tenant. Opaque beyond equality/ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(pub String);

/// Identifies a repository within a client's namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepoId(pub String);

/// A repository: owns all branches and entities under `(client, repo)`.
/// Not content-addressed; identified by `(ClientId, RepoId)` and stored
/// under that key by the `Store`.
#[derive(Debug, Clone, PartialEq)]
pub struct Repo {
    pub default_branch: String,
    pub created_at: Timestamp,
    /// Probability, in `[0, 1]`, that a write/delete triggers a partial
    /// commit. Default `0.02` (SPEC_FULL.md §6 Configuration).
    pub partial_commit_ratio: f64,
}

/// A branch pointer: the latest sealed commit, its tree, and the tree
/// reflecting all folded-but-uncommitted workspace writes.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub commit: Address,
    pub commit_root: Address,
    pub workspace_root: Address,
}

/// Milliseconds since the Unix epoch, kept as a distinct newtype the way
/// a timestamp used for content addressing should be (no local-clock
/// ambiguity baked into the hashed representation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub u64);

impl ContentHash for Timestamp {
    fn hash(&self, state: &mut impl crate::identity::DigestUpdate) {
        self.0.hash(state);
    }
}

/// An immutable, content-addressed commit.
#[derive(Debug, Clone, PartialEq, ContentHash)]
pub struct Commit {
    pub tree: Address,
    pub parents: Vec<Address>,
    pub committer: String,
    pub message: String,
    pub timestamp: Timestamp,
    pub metadata: BTreeMap<String, String>,
}

/// The type of a `TreeNode` entry: a child tree, or a leaf referencing an
/// `Object`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ContentHash)]
pub enum EntryType {
    Tree,
    Object,
}

/// One entry of a `TreeNode`, ordered by `name` within its node.
#[derive(Debug, Clone, PartialEq, ContentHash)]
pub struct Entry {
    pub name: String,
    pub entry_type: EntryType,
    pub address: Address,
    pub metadata: BTreeMap<String, String>,
}

/// An immutable, content-addressed interior or leaf-parent node of the
/// Merkle tree: an ordered set of entries, one per directory.
#[derive(Debug, Clone, Default, PartialEq, ContentHash)]
pub struct TreeNode {
    entries: BTreeMap<String, Entry>,
}

impl TreeNode {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub fn set(&mut self, entry: Entry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn remove(&mut self, name: &str) {
        self.entries.remove(name);
    }

    /// Direct children, in stored (lexicographic-by-name) order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }
}

/// Opaque metadata describing a stored blob; the bytes themselves live in
/// the out-of-scope object store.
#[derive(Debug, Clone, PartialEq, ContentHash)]
pub struct Object {
    pub size: u64,
    pub checksum: String,
    pub physical_address: String,
    pub metadata: BTreeMap<String, String>,
}

/// A single pending mutation against a path, staged in a branch's
/// workspace until the next partial commit folds it into the tree.
///
/// `change` is a two-variant enum rather than two optional fields, so the
/// ambiguous "present but neither a write nor a tombstone" state the
/// original source could represent is unrepresentable here (SPEC_FULL.md
/// §7): a path either has a staged write, a staged tombstone, or no
/// workspace entry at all, in which case the read falls through to the
/// tree.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceEntry {
    pub path: String,
    pub change: WorkspaceChange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkspaceChange {
    Write(Address),
    Tombstone,
}

impl WorkspaceEntry {
    pub fn write(path: impl Into<String>, address: Address) -> Self {
        WorkspaceEntry {
            path: path.into(),
            change: WorkspaceChange::Write(address),
        }
    }

    pub fn tombstone(path: impl Into<String>) -> Self {
        WorkspaceEntry {
            path: path.into(),
            change: WorkspaceChange::Tombstone,
        }
    }
}
