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

//! The partial-commit gate: "after this write, should we fold the
//! workspace into the Merkle tree now?"
//!
//! Abstracted behind a trait per SPEC_FULL.md §9, so tests can supply a
//! deterministic source instead of depending on the process-wide PRNG.

use rand::Rng;

/// Decides whether a partial commit should run, given the repo's
/// configured `partial_commit_ratio`.
pub trait FlushDecider: Send + Sync {
    fn should_flush(&self, ratio: f64) -> bool;
}

/// The production decider: draws a uniform `[0, 1)` sample and flushes if
/// it lands strictly below `ratio`, matching spec.md §4.4's "Partial
/// commit" rule.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomFlushDecider;

impl FlushDecider for RandomFlushDecider {
    fn should_flush(&self, ratio: f64) -> bool {
        rand::thread_rng().gen::<f64>() < ratio
    }
}

/// A deterministic decider for tests: either always, never, or driven by
/// an explicit, cyclical sequence of outcomes.
#[derive(Debug, Clone)]
pub enum FixedFlushDecider {
    Always,
    Never,
    Sequence {
        outcomes: Vec<bool>,
        next: std::sync::atomic::AtomicUsize,
    },
}

impl FixedFlushDecider {
    pub fn sequence(outcomes: Vec<bool>) -> Self {
        assert!(!outcomes.is_empty(), "sequence must not be empty");
        FixedFlushDecider::Sequence {
            outcomes,
            next: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

impl FlushDecider for FixedFlushDecider {
    fn should_flush(&self, _ratio: f64) -> bool {
        match self {
            FixedFlushDecider::Always => true,
            FixedFlushDecider::Never => false,
            FixedFlushDecider::Sequence { outcomes, next } => {
                let i = next.fetch_add(1, std::sync::atomic::Ordering::SeqCst) % outcomes.len();
                outcomes[i]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_never_flushes() {
        let d = FixedFlushDecider::Never;
        for _ in 0..10 {
            assert!(!d.should_flush(1.0));
        }
    }

    #[test]
    fn always_always_flushes() {
        let d = FixedFlushDecider::Always;
        for _ in 0..10 {
            assert!(d.should_flush(0.0));
        }
    }

    #[test]
    fn sequence_cycles() {
        let d = FixedFlushDecider::sequence(vec![true, false, false]);
        let got: Vec<bool> = (0..6).map(|_| d.should_flush(0.0)).collect();
        assert_eq!(got, vec![true, false, false, true, false, false]);
    }
}
