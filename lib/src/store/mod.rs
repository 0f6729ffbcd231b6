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

//! The transactional KV facade (spec.md §4.2): three transaction scopes,
//! each exposing typed operations over the entity namespace.
//!
//! The physical KV store is an out-of-scope external collaborator
//! (spec.md §1); what lives here is the trait boundary a real backend
//! must satisfy, plus [`memory::MemoryStore`], an in-process reference
//! implementation used by tests and by embedders without a production
//! backend wired up yet (grounded on jj-lib's `testutils::TestBackend`).
//!
//! Per SPEC_FULL.md §4.2 / Design Note 9, transaction functions are
//! generic over their return type rather than shuttling a boxed `Any`
//! through the call: `Store::repo_read_write` etc. take `impl FnMut(&mut
//! dyn RepoReadWriteOps) -> StoreResult<T>` and return `StoreResult<T>`
//! directly. That makes `Store` itself not object-safe; callers are
//! generic over `S: Store`, just as jj-lib callers are generic over (or
//! hold an `Arc<dyn Backend>` of) a concrete backend rather than reaching
//! for runtime reflection.

pub mod memory;

use crate::error::StoreResult;
use crate::identity::Address;
use crate::model::{Branch, Commit, Entry, Object, Repo, TreeNode, WorkspaceEntry};

/// `ClientReadOnly`: operations scoped to a single tenant, across all of
/// its repos.
pub trait ClientReadOnlyOps {
    fn list_repos(&mut self) -> StoreResult<Vec<String>>;
    fn read_repo(&mut self, repo: &str) -> StoreResult<Repo>;
}

/// `RepoReadOnly`: operations scoped to a single `(client, repo)`.
pub trait RepoReadOnlyOps {
    fn read_repo(&mut self) -> StoreResult<Repo>;
    fn read_branch(&mut self, name: &str) -> StoreResult<Branch>;
    fn read_from_workspace(&mut self, branch: &str, path: &str)
        -> StoreResult<WorkspaceEntry>;
    fn read_commit(&mut self, addr: &Address) -> StoreResult<Commit>;
    fn read_tree(&mut self, addr: &Address) -> StoreResult<TreeNode>;
    fn read_object(&mut self, addr: &Address) -> StoreResult<Object>;
    fn list_tree(&mut self, addr: &Address) -> StoreResult<Vec<Entry>>;
}

/// `RepoReadWrite`: all read operations plus writes.
pub trait RepoReadWriteOps: RepoReadOnlyOps {
    fn write_repo(&mut self, repo: &Repo) -> StoreResult<()>;
    fn write_branch(&mut self, name: &str, branch: &Branch) -> StoreResult<()>;
    fn delete_branch(&mut self, name: &str) -> StoreResult<()>;
    fn write_to_workspace(&mut self, branch: &str, entry: WorkspaceEntry) -> StoreResult<()>;
    fn list_workspace(&mut self, branch: &str) -> StoreResult<Vec<WorkspaceEntry>>;
    fn clear_workspace(&mut self, branch: &str) -> StoreResult<()>;
    fn write_commit(&mut self, addr: &Address, commit: &Commit) -> StoreResult<()>;
    fn write_tree(&mut self, addr: &Address, tree: &TreeNode) -> StoreResult<()>;
    fn write_object(&mut self, addr: &Address, object: &Object) -> StoreResult<()>;
}

/// The store entry point: runs a closure atomically within one of the
/// three transaction scopes. Either every write the closure makes commits,
/// or none do; on a serialization conflict the store may retry the
/// closure, so it must be deterministic and free of side effects outside
/// the transaction (spec.md §4.2 "Transaction contract").
pub trait Store: Send + Sync {
    fn client_read_only<T>(
        &self,
        client: &str,
        f: impl FnMut(&mut dyn ClientReadOnlyOps) -> StoreResult<T>,
    ) -> StoreResult<T>;

    fn repo_read_only<T>(
        &self,
        client: &str,
        repo: &str,
        f: impl FnMut(&mut dyn RepoReadOnlyOps) -> StoreResult<T>,
    ) -> StoreResult<T>;

    fn repo_read_write<T>(
        &self,
        client: &str,
        repo: &str,
        f: impl FnMut(&mut dyn RepoReadWriteOps) -> StoreResult<T>,
    ) -> StoreResult<T>;
}
