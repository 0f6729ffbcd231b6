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

//! Process-wide defaults for repository creation.
//!
//! The per-repo partial-commit ratio itself lives on the `Repo` entity
//! (SPEC_FULL.md §3) once a repo exists; what's configured here is only
//! what `CreateRepo` should use before that entity exists, following the
//! same `config`-crate-backed builder pattern jj-lib's `UserSettings`
//! uses to layer defaults with environment overrides.

use crate::model::Timestamp;

/// Global constant: the branch name created by `CreateRepo` when the
/// caller doesn't name one.
pub const DEFAULT_BRANCH: &str = "master";

/// Default probability (in `[0, 1]`) that a write/delete triggers a
/// partial commit. `0.02` means roughly 50 writes between folds.
pub const DEFAULT_PARTIAL_COMMIT_RATIO: f64 = 0.02;

/// Settings consulted by `Index::create_repo` and friends. Layered the way
/// jj-lib's `UserSettings` layers `config::Config` sources, with
/// environment variables as the override mechanism.
#[derive(Debug, Clone)]
pub struct IndexSettings {
    config: config::Config,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self::from_config(config::Config::default())
    }
}

impl IndexSettings {
    pub fn from_config(config: config::Config) -> Self {
        IndexSettings { config }
    }

    /// Builds settings from the process environment only, mirroring
    /// jj-lib's `UserSettings::for_user`. Unlike jj-lib there is no
    /// on-disk config file for this layer to read: the values configured
    /// here are process-wide defaults, not per-repo state.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Ok(value) = std::env::var("LEDGERTREE_DEFAULT_BRANCH") {
            builder = builder.set_override("repo.default_branch", value)?;
        }
        if let Ok(value) = std::env::var("LEDGERTREE_PARTIAL_COMMIT_RATIO") {
            builder = builder.set_override("repo.partial_commit_ratio", value)?;
        }
        Ok(Self::from_config(builder.build()?))
    }

    pub fn default_branch(&self) -> String {
        self.config
            .get_string("repo.default_branch")
            .unwrap_or_else(|_| DEFAULT_BRANCH.to_string())
    }

    pub fn partial_commit_ratio(&self) -> f64 {
        self.config
            .get_float("repo.partial_commit_ratio")
            .unwrap_or(DEFAULT_PARTIAL_COMMIT_RATIO)
    }
}

/// Wall-clock time, injectable so tests don't depend on the system clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The default `Clock`, backed by `SystemTime::now()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Timestamp(millis)
    }
}
