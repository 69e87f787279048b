//! Extended cron schedule parsing and normalization.
//!
//! A [`ScheduleSpec`] is a standard five-field cron specification plus an
//! optional `second` field. Normalization splits it into the minute-level
//! pattern (handed to the coarse trigger unchanged) and the ordered set of
//! second offsets within each matching minute.
//!
//! The `cron` crate requires 6 fields: `sec min hour day-of-month month
//! day-of-week`. The seconds expression is expanded by parsing it in the
//! seconds slot of a synthetic 6-field expression; the minute pattern is
//! validated the same way with a literal `0` seconds field.

use std::str::FromStr;

use cron::{Schedule as CronSchedule, TimeUnitSpec};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TriggerError};

// ── Schedule specification ──────────────────────────────────────────

/// User-supplied extended cron schedule. Immutable once supplied.
///
/// All fields except `second` follow standard cron-field syntax; `second`
/// follows cron-seconds syntax over the 0–59 domain (e.g. `"0,15,30,45"`,
/// `"*/10"`, or a bare `"30"`). Unspecified fields default to `*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSpec {
    pub minute: String,
    pub hour: String,
    pub day_of_month: String,
    pub month: String,
    pub day_of_week: String,
    /// The second(s) within each matching minute to fire at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second: Option<String>,
}

impl Default for ScheduleSpec {
    fn default() -> Self {
        Self {
            minute: "*".to_string(),
            hour: "*".to_string(),
            day_of_month: "*".to_string(),
            month: "*".to_string(),
            day_of_week: "*".to_string(),
            second: None,
        }
    }
}

impl ScheduleSpec {
    /// Every minute, with the given seconds expression.
    pub fn every_minute_at(second: impl Into<String>) -> Self {
        Self {
            second: Some(second.into()),
            ..Self::default()
        }
    }

    /// The five standard cron fields as one pattern string, unchanged.
    pub fn minute_pattern(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.minute.trim(),
            self.hour.trim(),
            self.day_of_month.trim(),
            self.month.trim(),
            self.day_of_week.trim(),
        )
    }

    /// Normalize into a minute-level pattern plus ordered second offsets.
    ///
    /// Pure transform: validates both parts and expands the seconds
    /// expression into its full matching set for one minute, ascending.
    /// If `second` is absent the offsets are `[0]`.
    pub fn normalize(&self) -> Result<NormalizedSchedule> {
        let minute_pattern = self.minute_pattern();

        // Validate the five minute-level fields up front so a malformed
        // schedule fails at bind time, not when the trigger first fires.
        CronSchedule::from_str(&format!("0 {}", minute_pattern)).map_err(|e| {
            TriggerError::InvalidSchedule(format!("bad cron pattern '{}': {}", minute_pattern, e))
        })?;

        let second_offsets = match self.second.as_deref().map(str::trim) {
            None | Some("") => vec![0],
            Some(expr) => expand_seconds(expr)?,
        };

        debug!(
            pattern = %minute_pattern,
            offsets = ?second_offsets,
            "normalized schedule"
        );

        Ok(NormalizedSchedule {
            minute_pattern,
            second_offsets,
        })
    }
}

/// Expand a cron-seconds expression into its matching set, ascending.
fn expand_seconds(expr: &str) -> Result<Vec<u32>> {
    let parsed = CronSchedule::from_str(&format!("{} * * * * *", expr)).map_err(|e| {
        TriggerError::InvalidSchedule(format!("bad seconds expression '{}': {}", expr, e))
    })?;

    Ok((0..60).filter(|s| parsed.seconds().includes(*s)).collect())
}

// ── Normalized schedule ─────────────────────────────────────────────

/// Result of normalizing a [`ScheduleSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedSchedule {
    /// The five standard cron fields, unchanged.
    pub minute_pattern: String,
    /// Ordered second offsets in [0, 59], one minute's matching set.
    pub second_offsets: Vec<u32>,
}

impl NormalizedSchedule {
    /// Whether one firing at the top of the minute suffices, making the
    /// wait/invoke loop unnecessary.
    ///
    /// Only `[0]` qualifies. A single nonzero second (e.g. `second: "30"`)
    /// still builds a loop with one wait/invoke step: the coarse trigger
    /// does not fire on an exact second anyway, so offsets are only ever
    /// relative to its activation time.
    pub fn is_fast_path(&self) -> bool {
        self.second_offsets == [0]
    }
}

// ── Tests ───────────────────────────────────────────────────────────
