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

//! The public index API (spec.md §4.4 / §6), binding identity, the store
//! abstraction, the Merkle tree engine, and the GC hook together.
//!
//! `Index<S>` is generic over `S: store::Store` rather than holding a
//! `Arc<dyn Store>`, per Design Note 9 (no runtime reflection for
//! transaction return values). It holds no mutable state of its own: the
//! store handle and the injected `GcHook`/`FlushDecider` are the only
//! fields, mirroring how jj-lib's `Arc<dyn Backend>` is shared read-only
//! across calls.

use std::sync::Arc;

use crate::config::IndexSettings;
use crate::error::{StoreError, StoreResult};
use crate::flush::{FlushDecider, RandomFlushDecider};
use crate::gc::{GcHook, NullGc};
use crate::identity::{hash, Address};
use crate::merkle;
use crate::model::{Branch, Commit, Entry, EntryType, Object, Repo, Timestamp, WorkspaceEntry};
use crate::store::{RepoReadOnlyOps, RepoReadWriteOps, Store};

use std::collections::BTreeMap;

/// The versioning engine's public entry point.
pub struct Index<S: Store> {
    store: S,
    gc: Arc<dyn GcHook>,
    flush: Arc<dyn FlushDecider>,
}

impl<S: Store> Index<S> {
    pub fn new(store: S) -> Self {
        Index {
            store,
            gc: Arc::new(NullGc),
            flush: Arc::new(RandomFlushDecider),
        }
    }

    pub fn with_gc_hook(mut self, gc: Arc<dyn GcHook>) -> Self {
        self.gc = gc;
        self
    }

    pub fn with_flush_decider(mut self, flush: Arc<dyn FlushDecider>) -> Self {
        self.flush = flush;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ---- Repo lifecycle -------------------------------------------------

    #[tracing::instrument(skip(self, settings))]
    pub fn create_repo(
        &self,
        client: &str,
        repo: &str,
        default_branch: &str,
        settings: &IndexSettings,
    ) -> StoreResult<()> {
        self.store.repo_read_write(client, repo, |txn| {
            let repo_record = Repo {
                default_branch: default_branch.to_string(),
                created_at: Timestamp(0),
                partial_commit_ratio: settings.partial_commit_ratio(),
            };
            txn.write_repo(&repo_record)?;

            let empty = Address::empty_tree();
            let epoch = Commit {
                tree: empty.clone(),
                parents: vec![],
                committer: String::new(),
                message: "Repository Epoch".to_string(),
                timestamp: Timestamp(0),
                metadata: BTreeMap::new(),
            };
            let commit_addr = hash(&epoch);
            txn.write_commit(&commit_addr, &epoch)?;

            let branch = Branch {
                commit: commit_addr.clone(),
                commit_root: empty.clone(),
                workspace_root: empty,
            };
            txn.write_branch(default_branch, &branch)?;
            Ok(())
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn get_repo(&self, client: &str, repo: &str) -> StoreResult<Repo> {
        self.store.repo_read_only(client, repo, |txn| txn.read_repo())
    }

    #[tracing::instrument(skip(self))]
    pub fn list_repos(&self, client: &str) -> StoreResult<Vec<String>> {
        self.store.client_read_only(client, |txn| txn.list_repos())
    }

    // ---- Object operations -----------------------------------------------

    /// Reads `path` on `branch`: workspace first, then the branch's read
    /// root (spec.md "Read-root resolution").
    #[tracing::instrument(skip(self))]
    pub fn read_object(
        &self,
        client: &str,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> StoreResult<Object> {
        self.store.repo_read_only(client, repo, |txn| {
            match txn.read_from_workspace(branch, path) {
                Ok(entry) => match entry.change {
                    crate::model::WorkspaceChange::Tombstone => Err(StoreError::NotFound),
                    crate::model::WorkspaceChange::Write(addr) => txn.read_object(&addr),
                },
                Err(e) if e.is_not_found() => {
                    let root = read_root(txn, client, repo, branch)?;
                    merkle::get_object(txn, &root, path)
                }
                Err(e) => Err(e),
            }
        })
    }

    #[tracing::instrument(skip(self, object))]
    pub fn write_object(
        &self,
        client: &str,
        repo: &str,
        branch: &str,
        path: &str,
        object: Object,
    ) -> StoreResult<()> {
        self.store.repo_read_write(client, repo, |txn| {
            let addr = hash(&object);
            txn.write_object(&addr, &object)?;
            txn.write_to_workspace(branch, WorkspaceEntry::write(path, addr.clone()))?;
            Ok(())
        })?;
        self.maybe_partial_commit(client, repo, branch)
    }

    #[tracing::instrument(skip(self))]
    pub fn delete_object(
        &self,
        client: &str,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> StoreResult<()> {
        self.store.repo_read_write(client, repo, |txn| {
            txn.write_to_workspace(branch, WorkspaceEntry::tombstone(path))
        })?;
        self.maybe_partial_commit(client, repo, branch)
    }

    #[tracing::instrument(skip(self))]
    pub fn list_objects(
        &self,
        client: &str,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> StoreResult<Vec<Entry>> {
        self.force_partial_commit(client, repo, branch)?;
        self.store.repo_read_only(client, repo, |txn| {
            let root = read_root(txn, client, repo, branch)?;
            if path.is_empty() {
                merkle::list_tree(txn, &root)
            } else {
                let dir_addr = merkle::get_address(txn, &root, path, EntryType::Tree)?;
                merkle::list_tree(txn, &dir_addr)
            }
        })
    }

    // ---- Branch lifecycle -------------------------------------------------

    #[tracing::instrument(skip(self))]
    pub fn commit(
        &self,
        client: &str,
        repo: &str,
        branch: &str,
        message: &str,
        committer: &str,
        metadata: BTreeMap<String, String>,
        now: Timestamp,
    ) -> StoreResult<Address> {
        self.force_partial_commit(client, repo, branch)?;
        self.store.repo_read_write(client, repo, |txn| {
            let branch_data = txn.read_branch(branch)?;
            let new_commit = Commit {
                tree: branch_data.workspace_root.clone(),
                parents: vec![branch_data.commit.clone()],
                committer: committer.to_string(),
                message: message.to_string(),
                timestamp: now,
                metadata: metadata.clone(),
            };
            let commit_addr = hash(&new_commit);
            txn.write_commit(&commit_addr, &new_commit)?;
            txn.write_branch(
                branch,
                &Branch {
                    commit: commit_addr.clone(),
                    commit_root: new_commit.tree.clone(),
                    workspace_root: new_commit.tree.clone(),
                },
            )?;
            Ok(commit_addr)
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn reset_branch(&self, client: &str, repo: &str, branch: &str) -> StoreResult<()> {
        self.store.repo_read_write(client, repo, |txn| {
            let branch_data = txn.read_branch(branch)?;
            txn.clear_workspace(branch)?;
            let discarded = branch_data.workspace_root.clone();
            txn.write_branch(
                branch,
                &Branch {
                    commit: branch_data.commit.clone(),
                    commit_root: branch_data.commit_root.clone(),
                    workspace_root: branch_data.commit_root.clone(),
                },
            )?;
            self.gc.on_abandoned(&discarded);
            Ok(())
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn delete_branch(&self, client: &str, repo: &str, branch: &str) -> StoreResult<()> {
        self.store.repo_read_write(client, repo, |txn| {
            let branch_data = txn.read_branch(branch)?;
            txn.clear_workspace(branch)?;
            self.gc.on_abandoned(&branch_data.workspace_root);
            txn.delete_branch(branch)
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn checkout(
        &self,
        client: &str,
        repo: &str,
        branch: &str,
        commit_addr: &Address,
    ) -> StoreResult<()> {
        self.store.repo_read_write(client, repo, |txn| {
            let target = txn.read_commit(commit_addr)?;
            let previous_workspace_root = txn
                .read_branch(branch)
                .map(|b| b.workspace_root)
                .ok();
            txn.clear_workspace(branch)?;
            if let Some(discarded) = &previous_workspace_root {
                self.gc.on_abandoned(discarded);
            }
            txn.write_branch(
                branch,
                &Branch {
                    commit: commit_addr.clone(),
                    commit_root: target.tree.clone(),
                    workspace_root: target.tree.clone(),
                },
            )
        })
    }

    /// Future work (spec.md §4.4 / §9): finds the lowest common ancestor
    /// commit of `source` and `destination`, produces a three-way tree
    /// merge, and creates a merge commit with two parents. The LCA
    /// discovery and conflict-resolution algorithm is not specified here
    /// — the original source's "optimistic concurrency" hint about the
    /// concurrency contract for merge is an open question this crate does
    /// not attempt to resolve (spec.md §9). This is a declared interface
    /// with a stub body: a no-op success.
    #[tracing::instrument(skip(self))]
    pub fn merge(
        &self,
        _client: &str,
        _repo: &str,
        _source: &str,
        _destination: &str,
    ) -> StoreResult<()> {
        Ok(())
    }

    // ---- Partial commit ---------------------------------------------------

    fn maybe_partial_commit(&self, client: &str, repo: &str, branch: &str) -> StoreResult<()> {
        let ratio = self.get_repo(client, repo)?.partial_commit_ratio;
        if self.flush.should_flush(ratio) {
            self.force_partial_commit(client, repo, branch)
        } else {
            Ok(())
        }
    }

    /// Folds `branch`'s workspace into its Merkle tree unconditionally.
    /// A concurrently deleted branch is treated as success with no-op
    /// (spec.md §7): the branch may have disappeared between the caller
    /// noticing it needed a flush and this running.
    fn force_partial_commit(&self, client: &str, repo: &str, branch: &str) -> StoreResult<()> {
        self.store.repo_read_write(client, repo, |txn| {
            let entries = txn.list_workspace(branch)?;
            if entries.is_empty() {
                return Ok(());
            }
            let branch_data = match txn.read_branch(branch) {
                Ok(b) => b,
                Err(e) if e.is_not_found() => return Ok(()),
                Err(e) => return Err(e),
            };
            let new_root = merkle::update(txn, &branch_data.workspace_root, &entries)?;
            txn.clear_workspace(branch)?;
            txn.write_branch(
                branch,
                &Branch {
                    commit: branch_data.commit.clone(),
                    commit_root: branch_data.commit_root.clone(),
                    workspace_root: new_root,
                },
            )
        })
    }
}

/// Read-root resolution (spec.md §4.4): the branch's own workspace root if
/// it exists, else the repo's default branch's commit root (never its
/// workspace root — that would leak another branch's dirty writes).
fn read_root(
    txn: &mut dyn RepoReadOnlyOps,
    _client: &str,
    _repo: &str,
    branch: &str,
) -> StoreResult<Address> {
    match txn.read_branch(branch) {
        Ok(b) => Ok(b.workspace_root),
        Err(e) if e.is_not_found() => {
            let repo_record = txn.read_repo()?;
            let default = txn.read_branch(&repo_record.default_branch)?;
            Ok(default.commit_root)
        }
        Err(e) => Err(e),
    }
}
