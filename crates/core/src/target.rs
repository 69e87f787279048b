//! The invocable-target abstraction.
//!
//! A target is the opaque unit of work a trigger fires: the compiler only
//! needs its stable identity (for naming), and the session driver only needs
//! a synchronous-from-the-caller's-perspective invoke accepting a payload.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Stable identity of an invocable target, used for resource naming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Error returned by a failed target invocation.
#[derive(Debug, thiserror::Error)]
#[error("target invocation failed: {0}")]
pub struct InvokeError(pub String);

/// The unit of work triggered by a binding.
///
/// Implementations wrap whatever actually runs (a function, a job, a test
/// double). The caller awaits `invoke` to completion before proceeding, so
/// an implementation that spawns background work must still resolve when the
/// invocation itself has been accepted.
#[async_trait]
pub trait InvocableTarget: Send + Sync {
    /// Stable identity, used to derive generated resource names.
    fn identity(&self) -> &TargetId;

    /// Invoke the target with the given payload.
    async fn invoke(&self, payload: serde_json::Value) -> Result<(), InvokeError>;
}

// ── Tests ───────────────────────────────────────────────────────────
