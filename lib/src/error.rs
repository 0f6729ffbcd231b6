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

//! Error kinds for the store and index layers.
//!
//! `NotFound` is the one sentinel callers are expected to branch on
//! explicitly; every other variant is an opaque failure that should abort
//! whatever transaction it was raised in.

use std::fmt::{Debug, Display};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("transaction aborted after concurrent modification: {0}")]
    Conflict(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }

    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoreError::Store(Box::new(err))
    }

    pub fn store_msg(msg: impl Into<String> + Display) -> Self {
        StoreError::Store(Box::new(StoreMessage(msg.to_string())))
    }
}

#[derive(Debug)]
struct StoreMessage(String);

impl Display for StoreMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for StoreMessage {}

pub type StoreResult<T> = Result<T, StoreError>;
