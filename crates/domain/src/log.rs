//! Execution log — immutable records of every engine decision.
//!
//! One entry is appended per decision, whether the action executed or was
//! skipped. Entries are never mutated afterwards, with one exception: undo
//! attaches a terminal `user_response` annotation to the original entry
//! while the reversal itself is a fresh state change.

use serde::{Deserialize, Serialize};

use crate::id::{DeviceId, HomeId, LogEntryId, RuleId};
use crate::rule::ActionKind;
use crate::time::Timestamp;

/// Denormalized snapshot of the rule a decision came from.
///
/// Kept inline so log entries outlive rule deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRef {
    pub id: RuleId,
    pub name: String,
}

/// Why a decision was skipped instead of executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Superseded,
    NoOp,
    InsufficientSavings,
    DeviceUpdateFailed,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Superseded => f.write_str("superseded by higher-priority rule"),
            Self::NoOp => f.write_str("no-op"),
            Self::InsufficientSavings => f.write_str("insufficient savings"),
            Self::DeviceUpdateFailed => f.write_str("device update failed"),
        }
    }
}

/// The action recorded in a log entry.
///
/// For executed entries, `devices` lists the devices that actually changed
/// state, which is exactly the set an undo must revert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedAction {
    pub kind: ActionKind,
    pub devices: Vec<DeviceId>,
}

/// Rough impact estimate attached to executed entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimatedImpact {
    pub affected_devices: usize,
    /// Estimated savings per hour at the home's tariff rate.
    pub savings_per_hour: f64,
}

/// The user's reaction to a logged decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserResponse {
    /// The decision was reversed. Terminal: an undone entry stays undone.
    Undone { at: Timestamp },
}

/// One immutable decision record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLogEntry {
    pub id: LogEntryId,
    pub home_id: HomeId,
    pub timestamp: Timestamp,
    /// Absent for monitor- or mode-originated decisions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<RuleRef>,
    pub action: LoggedAction,
    pub executed: bool,
    /// Present iff `executed` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,
    /// Human-readable justification for the decision.
    pub reasoning: String,
    pub estimated_impact: EstimatedImpact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_response: Option<UserResponse>,
}

impl ExecutionLogEntry {
    /// Record an executed decision.
    #[must_use]
    pub fn executed(
        home_id: HomeId,
        rule: Option<RuleRef>,
        action: LoggedAction,
        reasoning: impl Into<String>,
        estimated_impact: EstimatedImpact,
    ) -> Self {
        Self {
            id: LogEntryId::new(),
            home_id,
            timestamp: crate::time::now(),
            rule,
            action,
            executed: true,
            skip_reason: None,
            reasoning: reasoning.into(),
            estimated_impact,
            user_response: None,
        }
    }

    /// Record a skipped decision. No device mutation happened.
    #[must_use]
    pub fn skipped(
        home_id: HomeId,
        rule: Option<RuleRef>,
        action: LoggedAction,
        reason: SkipReason,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            id: LogEntryId::new(),
            home_id,
            timestamp: crate::time::now(),
            rule,
            action,
            executed: false,
            skip_reason: Some(reason),
            reasoning: reasoning.into(),
            estimated_impact: EstimatedImpact::default(),
            user_response: None,
        }
    }

    /// Whether undo is currently valid for this entry.
    #[must_use]
    pub fn is_undoable(&self) -> bool {
        self.executed && self.user_response.is_none()
    }

    /// The on/off state an undo must drive the entry's devices back into.
    #[must_use]
    pub fn undo_target_state(&self) -> bool {
        !self.action.kind.target_state()
    }
}
