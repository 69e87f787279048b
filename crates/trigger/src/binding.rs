//! Binding coordination: schedule + target → trigger wiring.
//!
//! The public entry point of the crate. [`TimeTrigger::bind`] normalizes the
//! schedule and emits either a direct minute-level trigger rule (fast path)
//! or a rule that starts one session of a synthesized wait/invoke loop per
//! activation (slow path). Caller-supplied transforms rewrite the generated
//! definitions before they are returned.

use serde::{Deserialize, Serialize};
use takt_core::{Defaults, ResourceName, TargetId};
use tracing::debug;

use crate::error::Result;
use crate::machine::{synthesize, LoopConfig, LoopDefinition};
use crate::plan::WaitPlan;
use crate::schedule::ScheduleSpec;

// ── Trigger rule definition ─────────────────────────────────────────

/// What the coarse trigger does on each activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerAction {
    /// Invoke the target directly; no loop exists.
    InvokeTarget(TargetId),
    /// Start one execution session of the named loop.
    StartLoop(ResourceName),
}

/// Definition of the minute-granularity trigger rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRuleConfig {
    pub name: ResourceName,
    pub enabled: bool,
    /// Five-field cron pattern the rule fires on.
    pub minute_pattern: String,
    pub action: TriggerAction,
}

// ── Transforms ──────────────────────────────────────────────────────

type RuleTransform = dyn Fn(TriggerRuleConfig) -> TriggerRuleConfig + Send + Sync;
type LoopTransform = dyn Fn(LoopConfig) -> LoopConfig + Send + Sync;

/// Caller-supplied rewrites applied to generated definitions.
///
/// The loop transform sees only [`LoopConfig`]; the compiled wait plan is
/// not part of that surface, so transforms cannot alter it.
#[derive(Default)]
pub struct Transforms {
    pub trigger_rule: Option<Box<RuleTransform>>,
    pub loop_config: Option<Box<LoopTransform>>,
}

impl Transforms {
    fn apply_rule(&self, config: TriggerRuleConfig) -> TriggerRuleConfig {
        match &self.trigger_rule {
            Some(f) => f(config),
            None => config,
        }
    }

    fn apply_loop(&self, config: LoopConfig) -> LoopConfig {
        match &self.loop_config {
            Some(f) => f(config),
            None => config,
        }
    }
}

// ── Binding ─────────────────────────────────────────────────────────

/// The final artifact of one `bind` call: the trigger wiring for one
/// schedule/target pair. Its lifetime matches the surrounding
/// infrastructure definition; it is not a runtime entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Binding {
    /// One trigger rule invoking the target directly.
    Direct { rule: TriggerRuleConfig },
    /// One trigger rule starting one loop session per activation.
    Looped {
        rule: TriggerRuleConfig,
        machine: LoopDefinition,
    },
}

impl Binding {
    pub fn rule(&self) -> &TriggerRuleConfig {
        match self {
            Binding::Direct { rule } | Binding::Looped { rule, .. } => rule,
        }
    }

    /// The synthesized loop, if this binding needed one.
    pub fn machine(&self) -> Option<&LoopDefinition> {
        match self {
            Binding::Direct { .. } => None,
            Binding::Looped { machine, .. } => Some(machine),
        }
    }
}

// ── Time trigger ────────────────────────────────────────────────────

/// A schedule waiting to be bound to targets.
///
/// `owner` is the explicit identity of whatever declares this trigger;
/// together with the target identity it prefixes every generated resource
/// name, so independent bindings never collide.
pub struct TimeTrigger {
    owner: String,
    schedule: ScheduleSpec,
    defaults: Defaults,
}

impl TimeTrigger {
    pub fn new(owner: impl Into<String>, schedule: ScheduleSpec) -> Self {
        Self {
            owner: owner.into(),
            schedule,
            defaults: Defaults::default(),
        }
    }

    /// Replace the synthesis defaults (e.g. from [`Defaults::from_env`]).
    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Bind this trigger's schedule to a target.
    pub fn bind(&self, target: &TargetId) -> Result<Binding> {
        self.bind_with(target, &Transforms::default())
    }

    /// Bind with caller-supplied transforms.
    ///
    /// The only user-facing error is an invalid schedule, raised here at
    /// bind time before any definition is produced.
    pub fn bind_with(&self, target: &TargetId, transforms: &Transforms) -> Result<Binding> {
        let normalized = self.schedule.normalize()?;
        let scoped = ResourceName::scoped(&self.owner, target);

        if normalized.is_fast_path() {
            // No sub-minute intervals requested: the minute-level rule
            // invokes the target directly.
            debug!(owner = %self.owner, target = %target, "fast path, direct binding");
            let rule = transforms.apply_rule(TriggerRuleConfig {
                name: scoped.child("trigger-rule"),
                enabled: true,
                minute_pattern: normalized.minute_pattern,
                action: TriggerAction::InvokeTarget(target.clone()),
            });
            return Ok(Binding::Direct { rule });
        }

        debug!(
            owner = %self.owner,
            target = %target,
            offsets = ?normalized.second_offsets,
            "slow path, synthesizing loop"
        );

        let plan = WaitPlan::compile(&normalized.second_offsets)?;
        let config = transforms.apply_loop(LoopConfig::new(
            scoped.child("trigger-function"),
            &self.defaults,
        ));
        let machine = synthesize(config, plan, target.clone());

        let rule = transforms.apply_rule(TriggerRuleConfig {
            name: scoped.child("trigger-rule"),
            enabled: true,
            minute_pattern: normalized.minute_pattern,
            action: TriggerAction::StartLoop(machine.config.name.clone()),
        });

        Ok(Binding::Looped { rule, machine })
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn quarter_minute() -> ScheduleSpec {
        ScheduleSpec::every_minute_at("0,15,30,45")
    }

    #[test]
    fn fast_path_binds_directly() {
        let trigger = TimeTrigger::new("sync", ScheduleSpec::default());
        let binding = trigger.bind(&TargetId::new("fn")).unwrap();

        assert!(binding.machine().is_none());
        assert_eq!(
            binding.rule().action,
            TriggerAction::InvokeTarget(TargetId::new("fn"))
        );
    }

    #[test]
    fn slow_path_wires_rule_to_loop() {
        let trigger = TimeTrigger::new("sync", quarter_minute());
        let binding = trigger.bind(&TargetId::new("fn")).unwrap();

        let machine = binding.machine().expect("loop expected");
        assert_eq!(machine.plan().waits(), &[0, 15, 15, 15]);
        assert_eq!(
            binding.rule().action,
            TriggerAction::StartLoop(machine.config.name.clone())
        );
    }

    #[test]
    fn generated_names_are_scoped() {
        let trigger = TimeTrigger::new("sync", quarter_minute());
        let binding = trigger.bind(&TargetId::new("fn")).unwrap();

        assert_eq!(binding.rule().name.as_str(), "sync-fn-trigger-rule");
        assert_eq!(
            binding.machine().unwrap().config.name.as_str(),
            "sync-fn-trigger-function"
        );
    }

    #[test]
    fn rule_transform_rewrites_rule_config() {
        let transforms = Transforms {
            trigger_rule: Some(Box::new(|mut rule: TriggerRuleConfig| {
                rule.enabled = false;
                rule
            })),
            loop_config: None,
        };
        let trigger = TimeTrigger::new("sync", quarter_minute());
        let binding = trigger
            .bind_with(&TargetId::new("fn"), &transforms)
            .unwrap();

        assert!(!binding.rule().enabled);
        // The compiled plan is untouched by transforms.
        assert_eq!(binding.machine().unwrap().plan().waits(), &[0, 15, 15, 15]);
    }

    #[test]
    fn loop_transform_rename_is_reflected_in_rule_action() {
        let transforms = Transforms {
            trigger_rule: None,
            loop_config: Some(Box::new(|mut config: LoopConfig| {
                config.name = ResourceName::new("renamed-loop");
                config
            })),
        };
        let trigger = TimeTrigger::new("sync", quarter_minute());
        let binding = trigger
            .bind_with(&TargetId::new("fn"), &transforms)
            .unwrap();

        assert_eq!(
            binding.rule().action,
            TriggerAction::StartLoop(ResourceName::new("renamed-loop"))
        );
    }

    #[test]
    fn invalid_second_fails_before_any_artifact() {
        let trigger = TimeTrigger::new("sync", ScheduleSpec::every_minute_at("70"));
        assert!(trigger.bind(&TargetId::new("fn")).is_err());
    }
}
