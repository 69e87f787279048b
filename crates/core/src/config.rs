//! Environment-driven defaults for synthesis.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Defaults applied to synthesized definitions unless the caller overrides
/// them through transforms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Bound on one execution session's total duration.
    pub session_timeout: Duration,
}

impl Defaults {
    /// Build defaults from environment variables (call `load_dotenv()` first).
    ///
    /// - `TAKT_SESSION_TIMEOUT_SECS` (default 90)
    pub fn from_env() -> Self {
        Self {
            session_timeout: Duration::from_secs(env_u64("TAKT_SESSION_TIMEOUT_SECS", 90)),
        }
    }

    /// Log the loaded defaults for startup diagnostics.
    pub fn log_summary(&self) {
        tracing::info!(
            "synthesis defaults: session_timeout={}s",
            self.session_timeout.as_secs()
        );
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            session_timeout: Duration::from_secs(90),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_90s() {
        assert_eq!(Defaults::default().session_timeout, Duration::from_secs(90));
    }

    #[test]
    fn from_env_reads_override() {
        env::set_var("TAKT_SESSION_TIMEOUT_SECS", "120");
        assert_eq!(
            Defaults::from_env().session_timeout,
            Duration::from_secs(120)
        );
        env::remove_var("TAKT_SESSION_TIMEOUT_SECS");
    }

    #[test]
    fn env_u64_falls_back_on_garbage() {
        env::set_var("TAKT_TEST_GARBAGE_U64", "ninety");
        assert_eq!(env_u64("TAKT_TEST_GARBAGE_U64", 90), 90);
        env::remove_var("TAKT_TEST_GARBAGE_U64");
    }
}
