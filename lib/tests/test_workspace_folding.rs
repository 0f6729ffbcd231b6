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

use ledgertree::store::{RepoReadOnlyOps, Store};
use ledgertree_testutils as fixtures;
use ledgertree_testutils::{BRANCH, CLIENT, REPO};

/// With a decider that always flushes, every write should fold the
/// workspace into the tree immediately: the branch's `workspace_root`
/// changes but `commit_root` (the last sealed commit's tree) does not move
/// until an explicit `commit`.
#[test]
fn partial_commit_updates_workspace_root_without_sealing_a_commit() {
    let index = fixtures::test_index_always_flush();
    fixtures::create_fixture_repo(&index);

    let before = index
        .store()
        .repo_read_only(CLIENT, REPO, |txn| txn.read_branch(BRANCH))
        .unwrap();

    index
        .write_object(CLIENT, REPO, BRANCH, "a.txt", fixtures::fixture_object("1"))
        .unwrap();

    let after = index
        .store()
        .repo_read_only(CLIENT, REPO, |txn| txn.read_branch(BRANCH))
        .unwrap();

    assert_eq!(before.commit, after.commit);
    assert_eq!(before.commit_root, after.commit_root);
    assert_ne!(before.workspace_root, after.workspace_root);
}

/// Listing objects forces a fold first, so a reader always sees writes
/// made through the same `Index` even with a decider that otherwise never
/// triggers an implicit flush.
#[test]
fn list_objects_forces_a_fold_even_without_a_flush_on_write() {
    let index = fixtures::test_index();
    fixtures::create_fixture_repo(&index);

    index
        .write_object(CLIENT, REPO, BRANCH, "dir/a.txt", fixtures::fixture_object("1"))
        .unwrap();

    let entries = index.list_objects(CLIENT, REPO, BRANCH, "dir").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "a.txt");
}

/// A deleted path disappears from the folded tree, and an empty directory
/// left behind by the deletion disappears from its parent's listing too.
#[test]
fn deleting_the_only_entry_in_a_directory_folds_the_directory_away() {
    let index = fixtures::test_index_always_flush();
    fixtures::create_fixture_repo(&index);

    index
        .write_object(CLIENT, REPO, BRANCH, "only/child.txt", fixtures::fixture_object("1"))
        .unwrap();
    index
        .delete_object(CLIENT, REPO, BRANCH, "only/child.txt")
        .unwrap();

    let root_entries = index.list_objects(CLIENT, REPO, BRANCH, "").unwrap();
    assert!(root_entries.is_empty());
}
