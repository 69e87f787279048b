//! Resource naming with explicit owner/target scoping.
//!
//! Every resource generated for a binding is named under a
//! `{owner}-{target}` prefix, so independent bindings of the same schedule
//! to different targets never collide. The owner id is passed in explicitly;
//! there is no ambient scope or registry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::target::TargetId;

/// Name of a generated infrastructure resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceName(String);

impl ResourceName {
    /// Create a name from a raw string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Create the scoped prefix for one `(owner, target)` binding.
    pub fn scoped(owner: &str, target: &TargetId) -> Self {
        Self(format!("{}-{}", owner, target))
    }

    /// Derive a child name by appending a `-{suffix}` segment.
    pub fn child(&self, suffix: &str) -> Self {
        Self(format!("{}-{}", self.0, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_prefix_joins_owner_and_target() {
        let target = TargetId::new("report-fn");
        let name = ResourceName::scoped("nightly", &target);
        assert_eq!(name.as_str(), "nightly-report-fn");
    }

    #[test]
    fn child_appends_suffix() {
        let name = ResourceName::new("nightly-report-fn").child("trigger-rule");
        assert_eq!(name.as_str(), "nightly-report-fn-trigger-rule");
    }

    #[test]
    fn distinct_targets_yield_distinct_prefixes() {
        let a = ResourceName::scoped("sync", &TargetId::new("fn-a"));
        let b = ResourceName::scoped("sync", &TargetId::new("fn-b"));
        assert_ne!(a, b);
    }

    #[test]
    fn serializes_as_plain_string() {
        let name = ResourceName::new("x-y");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"x-y\"");
    }
}
