//! Automation rules — user-authored trigger → action entries.
//!
//! Each rule has a [`Trigger`] that decides when it becomes eligible to
//! fire, a [`RuleAction`] describing the device mutation it performs, an
//! evaluation `priority` (lower evaluates first), optional constraints, and
//! rolling statistics updated by the engine after every decision.

mod action;
mod trigger;

pub use action::{ActionKind, RuleAction};
pub use trigger::{ThresholdDirection, ThresholdTarget, Trigger};

use serde::{Deserialize, Serialize};

use crate::error::{HomeFluxError, ValidationError};
use crate::id::{HomeId, RuleId};
use crate::time::Timestamp;

/// A user-defined condition → action automation entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationRule {
    pub id: RuleId,
    pub home_id: HomeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    /// Lower values win device conflicts; ties break by creation order.
    pub priority: i32,
    pub trigger: Trigger,
    pub action: RuleAction,
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(default)]
    pub stats: RuleStats,
    pub created_at: Timestamp,
}

impl AutomationRule {
    /// Create a builder for constructing an [`AutomationRule`].
    #[must_use]
    pub fn builder() -> AutomationRuleBuilder {
        AutomationRuleBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HomeFluxError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `action.devices` is empty ([`ValidationError::NoTargetDevices`])
    /// - the trigger schedule or threshold is malformed
    pub fn validate(&self) -> Result<(), HomeFluxError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.action.devices.is_empty() {
            return Err(ValidationError::NoTargetDevices.into());
        }
        self.trigger.validate()?;
        Ok(())
    }
}

/// Execution constraints attached to a rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Constraints {
    /// Skip the action when the estimated savings per hour fall below this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_savings: Option<f64>,
}

/// Rolling per-rule statistics, mutated only by the engine after each
/// evaluation. The success rate is derived on read and never stored.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RuleStats {
    /// Number of log entries tied to this rule (executed or skipped).
    pub trigger_count: u64,
    /// Number of those entries that executed.
    pub success_count: u64,
}

impl RuleStats {
    /// Record one decision outcome.
    pub fn record(&mut self, executed: bool) {
        self.trigger_count += 1;
        if executed {
            self.success_count += 1;
        }
    }

    /// Fraction of triggers that executed, in `0.0..=1.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.trigger_count == 0 {
            0.0
        } else {
            self.success_count as f64 / self.trigger_count as f64
        }
    }
}

/// Step-by-step builder for [`AutomationRule`].
#[derive(Debug, Default)]
pub struct AutomationRuleBuilder {
    id: Option<RuleId>,
    home_id: Option<HomeId>,
    name: Option<String>,
    description: Option<String>,
    enabled: Option<bool>,
    priority: Option<i32>,
    trigger: Option<Trigger>,
    action: Option<RuleAction>,
    constraints: Constraints,
    created_at: Option<Timestamp>,
}

impl AutomationRuleBuilder {
    #[must_use]
    pub fn id(mut self, id: RuleId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn home_id(mut self, home_id: HomeId) -> Self {
        self.home_id = Some(home_id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    #[must_use]
    pub fn action(mut self, action: RuleAction) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub fn min_savings(mut self, min_savings: f64) -> Self {
        self.constraints.min_savings = Some(min_savings);
        self
    }

    #[must_use]
    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    /// Consume the builder, validate, and return an [`AutomationRule`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeFluxError::Validation`] if required fields are missing
    /// or invariants fail.
    pub fn build(self) -> Result<AutomationRule, HomeFluxError> {
        let rule = AutomationRule {
            id: self.id.unwrap_or_default(),
            home_id: self.home_id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description,
            enabled: self.enabled.unwrap_or(true),
            priority: self.priority.unwrap_or(100),
            trigger: self.trigger.ok_or(ValidationError::MissingTrigger)?,
            action: self.action.unwrap_or(RuleAction {
                kind: ActionKind::TurnOff,
                devices: Vec::new(),
            }),
            constraints: self.constraints,
            stats: RuleStats::default(),
            created_at: self.created_at.unwrap_or_else(crate::time::now),
        };
        rule.validate()?;
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::DeviceId;
    use chrono::Weekday;

    fn time_trigger() -> Trigger {
        Trigger::Time {
            hour: 22,
            minute: 0,
            days: vec![Weekday::Mon],
        }
    }

    fn turn_off(devices: Vec<DeviceId>) -> RuleAction {
        RuleAction {
            kind: ActionKind::TurnOff,
            devices,
        }
    }

    fn valid_rule() -> AutomationRule {
        AutomationRule::builder()
            .name("Lights out at bedtime")
            .trigger(time_trigger())
            .action(turn_off(vec![DeviceId::new()]))
            .build()
            .unwrap()
    }

    #[test]
    fn should_build_valid_rule_when_required_fields_provided() {
        let rule = valid_rule();
        assert_eq!(rule.name, "Lights out at bedtime");
        assert!(rule.enabled);
        assert_eq!(rule.priority, 100);
        assert_eq!(rule.stats.trigger_count, 0);
    }

    #[test]
    fn should_return_validation_error_when_name_is_empty() {
        let result = AutomationRule::builder()
            .trigger(time_trigger())
            .action(turn_off(vec![DeviceId::new()]))
            .build();
        assert!(matches!(
            result,
            Err(HomeFluxError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_return_validation_error_when_devices_is_empty() {
        let result = AutomationRule::builder()
            .name("No targets")
            .trigger(time_trigger())
            .action(turn_off(vec![]))
            .build();
        assert!(matches!(
            result,
            Err(HomeFluxError::Validation(ValidationError::NoTargetDevices))
        ));
    }

    #[test]
    fn should_return_validation_error_when_schedule_days_empty() {
        let result = AutomationRule::builder()
            .name("No days")
            .trigger(Trigger::Time {
                hour: 8,
                minute: 0,
                days: vec![],
            })
            .action(turn_off(vec![DeviceId::new()]))
            .build();
        assert!(matches!(
            result,
            Err(HomeFluxError::Validation(ValidationError::NoScheduleDays))
        ));
    }

    #[test]
    fn should_return_validation_error_when_time_out_of_range() {
        let result = AutomationRule::builder()
            .name("Bad time")
            .trigger(Trigger::Time {
                hour: 24,
                minute: 0,
                days: vec![Weekday::Tue],
            })
            .action(turn_off(vec![DeviceId::new()]))
            .build();
        assert!(matches!(
            result,
            Err(HomeFluxError::Validation(
                ValidationError::TimeOutOfRange { .. }
            ))
        ));
    }

    #[test]
    fn should_compute_success_rate_from_counts() {
        let mut stats = RuleStats::default();
        assert!(stats.success_rate().abs() < f64::EPSILON);

        stats.record(true);
        stats.record(false);
        stats.record(true);
        stats.record(true);
        assert_eq!(stats.trigger_count, 4);
        assert_eq!(stats.success_count, 3);
        assert!((stats.success_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn should_carry_min_savings_constraint() {
        let rule = AutomationRule::builder()
            .name("Only when worth it")
            .trigger(time_trigger())
            .action(turn_off(vec![DeviceId::new()]))
            .min_savings(0.10)
            .build()
            .unwrap();
        assert_eq!(rule.constraints.min_savings, Some(0.10));
    }

    #[test]
    fn should_roundtrip_rule_through_serde_json() {
        let rule = valid_rule();
        let json = serde_json::to_string(&rule).unwrap();
        let parsed: AutomationRule = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, rule.id);
        assert_eq!(parsed.name, rule.name);
        assert_eq!(parsed.priority, rule.priority);
        assert_eq!(parsed.action.devices, rule.action.devices);
    }
}
