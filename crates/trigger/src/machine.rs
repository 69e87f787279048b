//! Execution-loop synthesis.
//!
//! Builds the state machine that reproduces a wait plan within one coarse
//! trigger activation: materialize the plan as the iteration sequence, then
//! for each element either wait-then-invoke or invoke directly, strictly one
//! iteration at a time. The machine is an explicit tagged-variant definition
//! with a pure transition function; [`crate::session`] drives it at runtime.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use takt_core::{Defaults, ResourceName, TargetId};
use tracing::debug;

use crate::plan::WaitPlan;

/// The loop dispatches exactly one iteration at a time.
pub const LOOP_CONCURRENCY: u32 = 1;

// ── Loop configuration ──────────────────────────────────────────────

/// Non-schedule-derived properties of a synthesized loop.
///
/// This is the surface caller transforms may rewrite. The wait plan itself
/// lives on [`LoopDefinition`] and is not reachable from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopConfig {
    pub name: ResourceName,
    /// Bound on one session's total duration. Exceeding it aborts the
    /// remaining iterations for that activation.
    pub session_timeout: Duration,
}

impl LoopConfig {
    pub fn new(name: ResourceName, defaults: &Defaults) -> Self {
        Self {
            name,
            session_timeout: defaults.session_timeout,
        }
    }
}

// ── Loop definition ─────────────────────────────────────────────────

/// A synthesized execution loop: the compiled wait plan plus the
/// configuration of the machine that walks it.
///
/// Sessions share nothing mutable; the definition is a read-only artifact
/// computed once at bind time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopDefinition {
    pub config: LoopConfig,
    /// Sequential-iteration bound; always [`LOOP_CONCURRENCY`].
    max_concurrency: u32,
    target: TargetId,
    plan: WaitPlan,
}

/// Build the loop definition for one binding.
pub fn synthesize(config: LoopConfig, plan: WaitPlan, target: TargetId) -> LoopDefinition {
    debug!(
        name = %config.name,
        steps = plan.len(),
        timeout_secs = config.session_timeout.as_secs(),
        "synthesized execution loop"
    );
    LoopDefinition {
        config,
        max_concurrency: LOOP_CONCURRENCY,
        target,
        plan,
    }
}

impl LoopDefinition {
    /// The compiled wait plan this loop walks.
    pub fn plan(&self) -> &WaitPlan {
        &self.plan
    }

    /// Identity of the target each iteration invokes.
    pub fn target(&self) -> &TargetId {
        &self.target
    }

    pub fn max_concurrency(&self) -> u32 {
        self.max_concurrency
    }

    /// Number of invocations one complete session performs.
    pub fn invoke_steps(&self) -> usize {
        self.plan.len()
    }

    /// Initial state for a fresh session.
    pub fn initial_state(&self) -> LoopState {
        LoopState::Start
    }

    /// Transition table.
    ///
    /// Pure: the session driver owns the cursor and performs the effects
    /// (sleeping in `Wait`, calling the target in `Invoke`).
    pub fn next_state(&self, state: LoopState) -> LoopState {
        match state {
            LoopState::Start => LoopState::ComputeLoopItems,
            LoopState::ComputeLoopItems => LoopState::LoopIterate { index: 0 },
            LoopState::LoopIterate { index } => {
                if index < self.plan.len() {
                    LoopState::Branch { index }
                } else {
                    LoopState::Done
                }
            }
            LoopState::Branch { index } => {
                // Zero waits skip the Wait state and invoke immediately.
                if self.plan.get(index).unwrap_or(0) > 0 {
                    LoopState::Wait { index }
                } else {
                    LoopState::Invoke { index }
                }
            }
            LoopState::Wait { index } => LoopState::Invoke { index },
            LoopState::Invoke { index } => LoopState::LoopIterate { index: index + 1 },
            LoopState::Done => LoopState::Done,
        }
    }

    /// Walk the machine from `Start` to `Done` without executing effects.
    ///
    /// Returns every state visited, in order. Useful for inspecting the
    /// synthesized shape (and for rendering into host-specific formats).
    pub fn walk(&self) -> Vec<LoopState> {
        let mut states = vec![self.initial_state()];
        loop {
            let next = self.next_state(*states.last().unwrap_or(&LoopState::Done));
            states.push(next);
            if next == LoopState::Done {
                return states;
            }
        }
    }
}

// ── Loop states ─────────────────────────────────────────────────────

/// States of the per-activation execution loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopState {
    /// Initial state for a fresh session.
    Start,
    /// Materializes the wait plan as the iteration sequence.
    ComputeLoopItems,
    /// Dispatches the next plan element, or finishes.
    LoopIterate { index: usize },
    /// Chooses between waiting and invoking directly.
    Branch { index: usize },
    /// Suspends the session for the current element's duration.
    Wait { index: usize },
    /// Calls the target with an empty payload.
    Invoke { index: usize },
    /// Terminal.
    Done,
}

// ── Tests ───────────────────────────────────────────────────────────
