//! Error types for schedule compilation and session execution.

use takt_core::InvokeError;

/// Errors raised while compiling a schedule into a binding.
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    /// The schedule failed cron validation (usually the `second` field).
    /// Raised at bind time, never deferred to trigger-fire time.
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    /// A compiler invariant was violated (negative wait delta, empty
    /// surviving-offset sequence). Indicates a bug in normalization or
    /// compilation, never a user input problem.
    #[error("internal consistency error: {0}")]
    InternalConsistency(String),
}

/// Result alias for compile-time operations.
pub type Result<T> = std::result::Result<T, TriggerError>;

/// Errors raised while driving one execution session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Target invocation failed. The session halts at this step; remaining
    /// iterations are not attempted and nothing is retried.
    #[error("invocation failed at step {step}: {source}")]
    Invoke {
        step: usize,
        #[source]
        source: InvokeError,
    },
}

// ── Tests ───────────────────────────────────────────────────────────
