//! Shared primitives for the taktgeber construct crates.
//!
//! This crate provides:
//! - Resource naming with explicit owner/target scoping
//! - The invocable-target abstraction (opaque unit of work)
//! - Environment-driven defaults for synthesis

pub mod config;
pub mod resource;
pub mod target;

pub use config::Defaults;
pub use resource::ResourceName;
pub use target::{InvocableTarget, InvokeError, TargetId};
