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

//! A content-addressed, branch-oriented versioning engine for tree-shaped
//! data, backed by a transactional key-value store.
//!
//! Data model (spec.md §3): a `Repo` owns a set of `Branch` pointers, each
//! naming a sealed `Commit` and two Merkle tree roots — one for the last
//! commit, one reflecting workspace writes not yet folded in. Writes land
//! in the branch's workspace and are opportunistically folded into the
//! tree by a partial commit ([`flush`]); `Index::commit` seals whatever the
//! workspace currently holds into a new `Commit`.
//!
//! The [`store`] module is the boundary to the (out-of-scope) physical KV
//! backend; [`store::memory`] is an in-process reference implementation.
//! [`merkle`] implements the tree itself; [`index::Index`] is the public
//! API tying everything together.

pub mod config;
pub mod error;
pub mod flush;
pub mod gc;
pub mod identity;
pub mod index;
pub mod merkle;
pub mod model;
pub mod path;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use identity::{Address, ContentHash};
pub use index::Index;
