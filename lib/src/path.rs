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

//! Forward-slash repository paths.
//!
//! A path is split on `/` into non-empty segments; only the final segment
//! may name an `OBJECT` entry, every earlier segment names a `TREE`. Empty
//! segments (a leading slash, a trailing slash, or `//`) are rejected here
//! so the Merkle layer never has to special-case them.

use crate::error::{StoreError, StoreResult};

/// A validated, non-empty sequence of path segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPath {
    segments: Vec<String>,
}

impl RepoPath {
    pub fn parse(path: &str) -> StoreResult<Self> {
        let path = path.strip_prefix('/').unwrap_or(path);
        if path.is_empty() {
            return Ok(RepoPath { segments: vec![] });
        }
        let segments: Vec<String> = path.split('/').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(StoreError::InvalidArgument(format!(
                "path {path:?} contains an empty segment"
            )));
        }
        Ok(RepoPath { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Splits into the parent directory's segments and the final
    /// (basename) segment. `None` for the root path.
    pub fn split(&self) -> Option<(&[String], &str)> {
        self.segments.split_last().map(|(last, init)| (init, last.as_str()))
    }

    pub fn to_internal_string(&self) -> String {
        self.segments.join("/")
    }
}
