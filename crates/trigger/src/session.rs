//! Execution sessions: one per coarse-trigger activation.
//!
//! A session owns the loop cursor for a single activation, walks the
//! transition table of its [`LoopDefinition`], sleeps on `Wait`, and invokes
//! the target on `Invoke`. Iteration is strictly sequential; the only
//! suspension point is the wait itself. Nothing persists across sessions,
//! and concurrent sessions (a previous activation still running when the
//! next one starts) are neither prevented nor ordered relative to each
//! other.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use takt_core::InvocableTarget;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::machine::{LoopDefinition, LoopState};

/// Outcome of one driven session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub started_at: DateTime<Utc>,
    /// Invocations actually performed.
    pub invocations: usize,
    /// False when the session timeout cut the loop short.
    pub completed: bool,
}

/// One activation of a synthesized loop.
///
/// Owned exclusively by the runtime driving this activation; consumed by
/// [`run`](ExecutionSession::run).
pub struct ExecutionSession<'a> {
    definition: &'a LoopDefinition,
    state: LoopState,
    invocations: usize,
}

impl<'a> ExecutionSession<'a> {
    pub fn new(definition: &'a LoopDefinition) -> Self {
        Self {
            definition,
            state: definition.initial_state(),
            invocations: 0,
        }
    }

    /// Drive the loop to completion or to the session timeout.
    ///
    /// Each invocation is awaited before the next iteration's wait starts.
    /// A failing invocation halts the session at that step; on timeout the
    /// remaining iterations are abandoned and the report says so.
    pub async fn run(mut self, target: &dyn InvocableTarget) -> Result<SessionReport, SessionError> {
        let started_at = Utc::now();
        let budget = self.definition.config.session_timeout;

        match timeout(budget, self.drive(target)).await {
            Ok(Ok(())) => Ok(SessionReport {
                started_at,
                invocations: self.invocations,
                completed: true,
            }),
            Ok(Err(err)) => {
                warn!(
                    machine = %self.definition.config.name,
                    error = %err,
                    "session halted by failed invocation"
                );
                Err(err)
            }
            Err(_elapsed) => {
                warn!(
                    machine = %self.definition.config.name,
                    invocations = self.invocations,
                    timeout_secs = budget.as_secs(),
                    "session timeout elapsed; aborting remaining iterations"
                );
                Ok(SessionReport {
                    started_at,
                    invocations: self.invocations,
                    completed: false,
                })
            }
        }
    }

    async fn drive(&mut self, target: &dyn InvocableTarget) -> Result<(), SessionError> {
        loop {
            self.state = self.definition.next_state(self.state);
            match self.state {
                LoopState::Wait { index } => {
                    let secs = self.definition.plan().get(index).unwrap_or(0);
                    debug!(index, secs, "waiting");
                    // TODO: subtract the previous invocation's duration from
                    // this wait so slow targets do not skew later offsets.
                    sleep(Duration::from_secs(u64::from(secs))).await;
                }
                LoopState::Invoke { index } => {
                    debug!(index, target = %self.definition.target(), "invoking");
                    target
                        .invoke(json!({}))
                        .await
                        .map_err(|source| SessionError::Invoke { step: index, source })?;
                    self.invocations += 1;
                }
                LoopState::Done => return Ok(()),
                LoopState::Start
                | LoopState::ComputeLoopItems
                | LoopState::LoopIterate { .. }
                | LoopState::Branch { .. } => {}
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use takt_core::{Defaults, InvokeError, ResourceName, TargetId};
    use tokio::time::Instant;

    use super::*;
    use crate::machine::{synthesize, LoopConfig};
    use crate::plan::WaitPlan;

    /// Test double recording the virtual time of each invocation.
    struct RecordingTarget {
        id: TargetId,
        epoch: Instant,
        invoked_at: Mutex<Vec<u64>>,
        fail_on_step: Option<usize>,
    }

    impl RecordingTarget {
        fn new(epoch: Instant) -> Self {
            Self {
                id: TargetId::new("recorder"),
                epoch,
                invoked_at: Mutex::new(Vec::new()),
                fail_on_step: None,
            }
        }

        fn failing_on(epoch: Instant, step: usize) -> Self {
            Self {
                fail_on_step: Some(step),
                ..Self::new(epoch)
            }
        }

        fn offsets(&self) -> Vec<u64> {
            self.invoked_at.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InvocableTarget for RecordingTarget {
        fn identity(&self) -> &TargetId {
            &self.id
        }

        async fn invoke(&self, payload: serde_json::Value) -> Result<(), InvokeError> {
            assert_eq!(payload, json!({}));
            let mut seen = self.invoked_at.lock().unwrap();
            if self.fail_on_step == Some(seen.len()) {
                return Err(InvokeError("simulated failure".into()));
            }
            seen.push(self.epoch.elapsed().as_secs());
            Ok(())
        }
    }

    fn definition(offsets: &[u32], timeout: Duration) -> LoopDefinition {
        let defaults = Defaults {
            session_timeout: timeout,
        };
        synthesize(
            LoopConfig::new(ResourceName::new("t-recorder-trigger-function"), &defaults),
            WaitPlan::compile(offsets).unwrap(),
            TargetId::new("recorder"),
        )
    }

    // ── Ordering and relative timing ────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn invocations_land_on_plan_offsets() {
        let def = definition(&[0, 15, 30, 45], Duration::from_secs(90));
        let target = RecordingTarget::new(Instant::now());

        let report = ExecutionSession::new(&def).run(&target).await.unwrap();

        assert!(report.completed);
        assert_eq!(report.invocations, 4);
        assert_eq!(target.offsets(), vec![0, 15, 30, 45]);
    }

    #[tokio::test(start_paused = true)]
    async fn single_nonzero_offset_waits_then_invokes_once() {
        let def = definition(&[30], Duration::from_secs(90));
        let target = RecordingTarget::new(Instant::now());

        let report = ExecutionSession::new(&def).run(&target).await.unwrap();

        assert_eq!(report.invocations, 1);
        assert_eq!(target.offsets(), vec![30]);
    }

    // ── Failure policy ──────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn failed_invocation_halts_the_session() {
        let def = definition(&[0, 15, 30], Duration::from_secs(90));
        let target = RecordingTarget::failing_on(Instant::now(), 1);

        let err = ExecutionSession::new(&def).run(&target).await.unwrap_err();

        assert!(matches!(err, SessionError::Invoke { step: 1, .. }));
        // The first invocation happened; nothing after the failure did.
        assert_eq!(target.offsets(), vec![0]);
    }

    // ── Timeout ─────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn timeout_aborts_remaining_iterations() {
        let def = definition(&[0, 15, 30, 45], Duration::from_secs(20));
        let target = RecordingTarget::new(Instant::now());

        let report = ExecutionSession::new(&def).run(&target).await.unwrap();

        assert!(!report.completed);
        assert_eq!(report.invocations, 2);
        assert_eq!(target.offsets(), vec![0, 15]);
    }
}
