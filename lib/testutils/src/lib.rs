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

//! Shared fixtures for integration tests against [`ledgertree`].

use std::sync::Arc;

use ledgertree::config::IndexSettings;
use ledgertree::flush::FixedFlushDecider;
use ledgertree::model::{Object, Timestamp};
use ledgertree::store::memory::MemoryStore;
use ledgertree::Index;

pub const CLIENT: &str = "acme";
pub const REPO: &str = "widgets";
pub const BRANCH: &str = "main";

/// Builds an `Index` over a fresh `MemoryStore`, with a `FlushDecider` that
/// never triggers an implicit partial commit so tests control folding
/// explicitly via `Index::commit` / the public read paths that force one.
pub fn test_index() -> Index<MemoryStore> {
    Index::new(MemoryStore::new()).with_flush_decider(Arc::new(FixedFlushDecider::Never))
}

/// Same as [`test_index`], but with a decider that flushes on every write,
/// for exercising the partial-commit path directly.
pub fn test_index_always_flush() -> Index<MemoryStore> {
    Index::new(MemoryStore::new()).with_flush_decider(Arc::new(FixedFlushDecider::Always))
}

/// Creates [`REPO`] under [`CLIENT`] with [`BRANCH`] as its default branch.
pub fn create_fixture_repo(index: &Index<MemoryStore>) {
    index
        .create_repo(CLIENT, REPO, BRANCH, &IndexSettings::default())
        .expect("fixture repo creation must succeed");
}

/// A trivial `Object` referencing no real physical bytes, for tests that
/// only care about tree shape.
pub fn fixture_object(checksum: &str) -> Object {
    Object {
        size: 0,
        checksum: checksum.to_string(),
        physical_address: format!("mem://{checksum}"),
        metadata: Default::default(),
    }
}

pub fn epoch() -> Timestamp {
    Timestamp(0)
}
