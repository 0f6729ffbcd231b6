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

use ledgertree::config::IndexSettings;
use ledgertree_testutils as fixtures;
use ledgertree_testutils::CLIENT;

#[test]
fn list_repos_is_scoped_per_client_and_sorted() {
    let index = fixtures::test_index();
    index
        .create_repo(CLIENT, "zebra", "main", &IndexSettings::default())
        .unwrap();
    index
        .create_repo(CLIENT, "antelope", "main", &IndexSettings::default())
        .unwrap();
    index
        .create_repo("other-client", "whatever", "main", &IndexSettings::default())
        .unwrap();

    let repos = index.list_repos(CLIENT).unwrap();
    assert_eq!(repos, vec!["antelope".to_string(), "zebra".to_string()]);
}

#[test]
fn get_repo_on_an_unknown_name_is_not_found() {
    let index = fixtures::test_index();
    let err = index.get_repo(CLIENT, "ghost").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn created_repo_starts_with_an_empty_tree_on_its_default_branch() {
    let index = fixtures::test_index();
    index
        .create_repo(CLIENT, "fresh", "main", &IndexSettings::default())
        .unwrap();

    let entries = index.list_objects(CLIENT, "fresh", "main", "").unwrap();
    assert!(entries.is_empty());
}
