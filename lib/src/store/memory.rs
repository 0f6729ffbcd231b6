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

//! An in-process reference [`Store`] implementation.
//!
//! Grounded on jj-lib's `testutils::test_backend::TestBackend`: a strict,
//! mutex-guarded, in-memory stand-in for the real (out-of-scope)
//! transactional KV backend. Isolation is coarse-grained — one lock per
//! `(client, repo)` partition held for the whole transaction closure —
//! which satisfies the "all or nothing" contract but is not what a
//! production snapshot-isolated store would do; see DESIGN.md for the
//! tradeoff this reference implementation makes.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use itertools::Itertools;

use crate::error::{StoreError, StoreResult};
use crate::identity::Address;
use crate::model::{Branch, Commit, Entry, Object, Repo, TreeNode, WorkspaceEntry};

use super::{ClientReadOnlyOps, RepoReadOnlyOps, RepoReadWriteOps, Store};

#[derive(Default)]
struct RepoData {
    repo: Option<Repo>,
    branches: HashMap<String, Branch>,
    // branch -> path -> pending entry
    workspaces: HashMap<String, BTreeMap<String, WorkspaceEntry>>,
    commits: HashMap<Address, Commit>,
    trees: HashMap<Address, TreeNode>,
    objects: HashMap<Address, Object>,
}

/// An in-memory [`Store`], keyed by `(client, repo)`. Safe to share across
/// threads; clone the `Arc` it's usually wrapped in rather than the store
/// itself.
#[derive(Default)]
pub struct MemoryStore {
    repos: Mutex<HashMap<(String, String), Arc<Mutex<RepoData>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn repo_slot(&self, client: &str, repo: &str) -> Arc<Mutex<RepoData>> {
        let mut repos = self.repos.lock().unwrap();
        repos
            .entry((client.to_string(), repo.to_string()))
            .or_insert_with(|| Arc::new(Mutex::new(RepoData::default())))
            .clone()
    }

    fn existing_repo_slot(&self, client: &str, repo: &str) -> Option<Arc<Mutex<RepoData>>> {
        self.repos
            .lock()
            .unwrap()
            .get(&(client.to_string(), repo.to_string()))
            .cloned()
    }
}

struct ClientTxn<'a> {
    store: &'a MemoryStore,
    client: &'a str,
}

impl ClientReadOnlyOps for ClientTxn<'_> {
    fn list_repos(&mut self) -> StoreResult<Vec<String>> {
        let repos = self.store.repos.lock().unwrap();
        let names: Vec<String> = repos
            .iter()
            .filter(|((client, _), _)| client == self.client)
            .filter(|(_, slot)| slot.lock().unwrap().repo.is_some())
            .map(|((_, repo), _)| repo.clone())
            .sorted()
            .collect();
        Ok(names)
    }

    fn read_repo(&mut self, repo: &str) -> StoreResult<Repo> {
        let slot = self
            .store
            .existing_repo_slot(self.client, repo)
            .ok_or(StoreError::NotFound)?;
        let data = slot.lock().unwrap();
        data.repo.clone().ok_or(StoreError::NotFound)
    }
}

struct RepoTxn<'a> {
    data: MutexGuard<'a, RepoData>,
}

impl RepoReadOnlyOps for RepoTxn<'_> {
    fn read_repo(&mut self) -> StoreResult<Repo> {
        self.data.repo.clone().ok_or(StoreError::NotFound)
    }

    fn read_branch(&mut self, name: &str) -> StoreResult<Branch> {
        self.data
            .branches
            .get(name)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn read_from_workspace(
        &mut self,
        branch: &str,
        path: &str,
    ) -> StoreResult<WorkspaceEntry> {
        self.data
            .workspaces
            .get(branch)
            .and_then(|ws| ws.get(path))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn read_commit(&mut self, addr: &Address) -> StoreResult<Commit> {
        self.data
            .commits
            .get(addr)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn read_tree(&mut self, addr: &Address) -> StoreResult<TreeNode> {
        if addr == &Address::empty_tree() {
            return Ok(TreeNode::default());
        }
        self.data
            .trees
            .get(addr)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn read_object(&mut self, addr: &Address) -> StoreResult<Object> {
        self.data
            .objects
            .get(addr)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn list_tree(&mut self, addr: &Address) -> StoreResult<Vec<Entry>> {
        let tree = self.read_tree(addr)?;
        Ok(tree.entries().cloned().collect())
    }
}

impl RepoReadWriteOps for RepoTxn<'_> {
    fn write_repo(&mut self, repo: &Repo) -> StoreResult<()> {
        self.data.repo = Some(repo.clone());
        Ok(())
    }

    fn write_branch(&mut self, name: &str, branch: &Branch) -> StoreResult<()> {
        self.data.branches.insert(name.to_string(), branch.clone());
        Ok(())
    }

    fn delete_branch(&mut self, name: &str) -> StoreResult<()> {
        self.data.branches.remove(name);
        self.data.workspaces.remove(name);
        Ok(())
    }

    fn write_to_workspace(&mut self, branch: &str, entry: WorkspaceEntry) -> StoreResult<()> {
        self.data
            .workspaces
            .entry(branch.to_string())
            .or_default()
            .insert(entry.path.clone(), entry);
        Ok(())
    }

    fn list_workspace(&mut self, branch: &str) -> StoreResult<Vec<WorkspaceEntry>> {
        Ok(self
            .data
            .workspaces
            .get(branch)
            .map(|ws| ws.values().cloned().collect())
            .unwrap_or_default())
    }

    fn clear_workspace(&mut self, branch: &str) -> StoreResult<()> {
        self.data.workspaces.remove(branch);
        Ok(())
    }

    fn write_commit(&mut self, addr: &Address, commit: &Commit) -> StoreResult<()> {
        self.data.commits.insert(addr.clone(), commit.clone());
        Ok(())
    }

    fn write_tree(&mut self, addr: &Address, tree: &TreeNode) -> StoreResult<()> {
        self.data.trees.insert(addr.clone(), tree.clone());
        Ok(())
    }

    fn write_object(&mut self, addr: &Address, object: &Object) -> StoreResult<()> {
        self.data.objects.insert(addr.clone(), object.clone());
        Ok(())
    }
}

impl Store for MemoryStore {
    fn client_read_only<T>(
        &self,
        client: &str,
        mut f: impl FnMut(&mut dyn ClientReadOnlyOps) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut txn = ClientTxn {
            store: self,
            client,
        };
        f(&mut txn)
    }

    fn repo_read_only<T>(
        &self,
        client: &str,
        repo: &str,
        mut f: impl FnMut(&mut dyn RepoReadOnlyOps) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let slot = self.existing_repo_slot(client, repo).ok_or(StoreError::NotFound)?;
        let data = slot.lock().unwrap();
        let mut txn = RepoTxn { data };
        f(&mut txn)
    }

    fn repo_read_write<T>(
        &self,
        client: &str,
        repo: &str,
        mut f: impl FnMut(&mut dyn RepoReadWriteOps) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let slot = self.repo_slot(client, repo);
        let data = slot.lock().unwrap();
        let mut txn = RepoTxn { data };
        f(&mut txn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_repo_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .repo_read_only("c", "r", |txn| txn.read_repo())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn empty_tree_reads_without_being_written() {
        let store = MemoryStore::new();
        // repo_read_write auto-vivifies the slot even before WriteRepo runs.
        let tree = store
            .repo_read_write("c", "r", |txn| txn.read_tree(&Address::empty_tree()))
            .unwrap();
        assert!(tree.is_empty());
    }

    fn write_repo(store: &MemoryStore, client: &str, repo: &str) {
        store
            .repo_read_write(client, repo, |txn| {
                txn.write_repo(&Repo {
                    default_branch: "main".to_string(),
                    created_at: crate::model::Timestamp(0),
                    partial_commit_ratio: 0.0,
                })
            })
            .unwrap();
    }

    #[test]
    fn list_repos_is_scoped_to_client() {
        let store = MemoryStore::new();
        write_repo(&store, "a", "r1");
        write_repo(&store, "a", "r2");
        write_repo(&store, "b", "r3");
        let names = store
            .client_read_only("a", |txn| txn.list_repos())
            .unwrap();
        assert_eq!(names, vec!["r1".to_string(), "r2".to_string()]);
    }

    #[test]
    fn a_partition_touched_by_a_pure_read_does_not_appear_in_list_repos() {
        let store = MemoryStore::new();
        // Auto-vivifies the ("a", "ghost") slot without ever writing a Repo
        // record into it.
        let _ = store.repo_read_write("a", "ghost", |txn| txn.read_tree(&Address::empty_tree()));

        let names = store.client_read_only("a", |txn| txn.list_repos()).unwrap();
        assert!(names.is_empty());
    }
}
