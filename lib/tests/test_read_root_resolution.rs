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

use std::collections::BTreeMap;

use ledgertree::config::IndexSettings;
use ledgertree_testutils as fixtures;
use ledgertree_testutils::{BRANCH, CLIENT, REPO};

#[test]
fn reading_an_unknown_branch_falls_back_to_the_default_branchs_commit_root() {
    let index = fixtures::test_index();
    fixtures::create_fixture_repo(&index);

    index
        .write_object(CLIENT, REPO, BRANCH, "sealed.txt", fixtures::fixture_object("s"))
        .unwrap();
    index
        .commit(
            CLIENT,
            REPO,
            BRANCH,
            "seal",
            "alice",
            BTreeMap::new(),
            fixtures::epoch(),
        )
        .unwrap();

    // "feature" was never created as a branch; reads against it fall
    // through to the repo's default branch commit root.
    let read = index
        .read_object(CLIENT, REPO, "feature", "sealed.txt")
        .unwrap();
    assert_eq!(read.checksum, "s");
}

#[test]
fn unknown_branch_fallback_never_leaks_the_default_branchs_uncommitted_workspace() {
    let index = fixtures::test_index();
    fixtures::create_fixture_repo(&index);

    // Not yet committed: lives only in the default branch's workspace root.
    index
        .write_object(CLIENT, REPO, BRANCH, "draft.txt", fixtures::fixture_object("d"))
        .unwrap();

    let err = index
        .read_object(CLIENT, REPO, "feature", "draft.txt")
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn unknown_repo_surfaces_not_found_rather_than_falling_back() {
    let index = fixtures::test_index();
    let err = index
        .read_object(CLIENT, "no-such-repo", BRANCH, "a.txt")
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn create_repo_honors_the_requested_default_branch_name() {
    let index = fixtures::test_index();
    index
        .create_repo(CLIENT, "r2", "trunk", &IndexSettings::default())
        .unwrap();
    let repo = index.get_repo(CLIENT, "r2").unwrap();
    assert_eq!(repo.default_branch, "trunk");
}
