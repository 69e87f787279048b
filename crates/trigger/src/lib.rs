//! Sub-minute trigger compiler.
//!
//! Coarse periodic triggers resolve only to minute granularity. This crate
//! accepts an extended cron schedule whose optional `second` field names the
//! second(s) within each matching minute an action should fire, and compiles
//! it into trigger wiring:
//!
//! - **Fast path** (seconds absent or `0`): one minute-level trigger rule
//!   invoking the target directly.
//! - **Slow path**: the seconds expression is expanded into offsets,
//!   compiled into a plan of relative waits, and synthesized into a
//!   sequential wait/invoke loop that one minute-level rule starts once per
//!   activation.
//!
//! Timing is relative: the loop reproduces the requested pattern within one
//! activation, but inherits the coarse trigger's own firing jitter.

pub mod binding;
pub mod error;
pub mod machine;
pub mod plan;
pub mod schedule;
pub mod session;

pub use binding::{Binding, TimeTrigger, Transforms, TriggerAction, TriggerRuleConfig};
pub use error::{Result, SessionError, TriggerError};
pub use machine::{synthesize, LoopConfig, LoopDefinition, LoopState, LOOP_CONCURRENCY};
pub use plan::WaitPlan;
pub use schedule::{NormalizedSchedule, ScheduleSpec};
pub use session::{ExecutionSession, SessionReport};
