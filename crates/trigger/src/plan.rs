//! Wait-plan compilation from second offsets.
//!
//! Turns the ordered second offsets of a normalized schedule into the
//! sequence of relative waits a session walks through: first the wait from
//! the start of the minute, then the gap to each subsequent firing.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TriggerError};

/// Ordered relative wait durations (seconds), one per invocation within a
/// single minute activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaitPlan(Vec<u32>);

impl WaitPlan {
    /// Compile second offsets into relative waits.
    ///
    /// Adjacent equal offsets collapse into one: an entry survives only if
    /// it differs from the immediately previously kept entry (the first
    /// entry always survives). This mirrors the duplicate handling of the
    /// seconds expansion it consumes, which can emit run-adjacent repeats
    /// but never a globally unsorted sequence.
    ///
    /// The surviving sequence must be ascending; a smaller offset after a
    /// larger one is an internal error, as is an empty input.
    pub fn compile(second_offsets: &[u32]) -> Result<Self> {
        let mut kept: Vec<u32> = Vec::with_capacity(second_offsets.len());
        for &offset in second_offsets {
            if kept.last() != Some(&offset) {
                kept.push(offset);
            }
        }

        let Some(&first) = kept.first() else {
            return Err(TriggerError::InternalConsistency(
                "no second offsets survived deduplication".to_string(),
            ));
        };

        let mut waits = Vec::with_capacity(kept.len());
        waits.push(first);
        for window in kept.windows(2) {
            let (prev, next) = (window[0], window[1]);
            if next < prev {
                return Err(TriggerError::InternalConsistency(format!(
                    "second offsets out of order: {} after {}",
                    next, prev
                )));
            }
            waits.push(next - prev);
        }

        debug!(steps = waits.len(), "compiled wait plan");
        Ok(Self(waits))
    }

    /// The relative waits, in invocation order.
    pub fn waits(&self) -> &[u32] {
        &self.0
    }

    /// Wait for one step, if the step exists.
    pub fn get(&self, step: usize) -> Option<u32> {
        self.0.get(step).copied()
    }

    /// Number of invocations in one session.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all waits: the offset of the last firing within the minute.
    pub fn total_seconds(&self) -> u32 {
        self.0.iter().sum()
    }
}

// ── Tests ───────────────────────────────────────────────────────────
