//! Running accuracy tallies threaded through a reconciliation pass.

use serde::{Deserialize, Serialize};

/// Cumulative outcome counters.
///
/// Rendered in prompts under fixed symbols: X = detected, Y = missed,
/// Z = correct, W = incorrect. Counters only ever grow; a pass threads
/// successive snapshots through [`apply`](Self::apply).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutcomeCounters {
    pub detected: u32,
    pub missed: u32,
    pub correct: u32,
    pub incorrect: u32,
}

/// A fixed, non-negative increment attached to an environment/scenario pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CounterDelta {
    pub detected: u32,
    pub missed: u32,
    pub correct: u32,
    pub incorrect: u32,
}

impl CounterDelta {
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    pub const fn new(detected: u32, missed: u32, correct: u32, incorrect: u32) -> Self {
        Self {
            detected,
            missed,
            correct,
            incorrect,
        }
    }
}

impl OutcomeCounters {
    pub const fn new(detected: u32, missed: u32, correct: u32, incorrect: u32) -> Self {
        Self {
            detected,
            missed,
            correct,
            incorrect,
        }
    }

    /// Return the snapshot that results from adding `delta`.
    #[must_use]
    pub fn apply(self, delta: CounterDelta) -> Self {
        Self {
            detected: self.detected.saturating_add(delta.detected),
            missed: self.missed.saturating_add(delta.missed),
            correct: self.correct.saturating_add(delta.correct),
            incorrect: self.incorrect.saturating_add(delta.incorrect),
        }
    }

    /// Number of patients scored as either correct or incorrect.
    pub fn scored(&self) -> u32 {
        self.correct.saturating_add(self.incorrect)
    }
}
