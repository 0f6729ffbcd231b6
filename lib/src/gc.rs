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

//! Garbage-collection hook.
//!
//! Invoked whenever a tree root becomes logically unreachable (branch
//! reset, delete, checkout). Policy is out of scope (spec.md §1); this
//! crate only guarantees the hook is called at every such site so a
//! future mark/collect implementation can slot in without re-plumbing the
//! orchestrator.

use crate::identity::Address;

pub trait GcHook: std::fmt::Debug + Send + Sync {
    fn on_abandoned(&self, root: &Address);
}

/// The default hook: does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullGc;

impl GcHook for NullGc {
    fn on_abandoned(&self, root: &Address) {
        tracing::trace!(root = %root.hex(), "tree root abandoned, gc policy deferred");
    }
}
