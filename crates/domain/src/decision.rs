//! Decisions — the intermediate output of one engine pass.
//!
//! Trigger evaluation produces per-device [`CandidateAction`]s, conflict
//! resolution turns the candidate set into [`Decision`]s, and the executor
//! applies them. A decision always yields exactly one log entry.

use crate::id::{DeviceId, RuleId};
use crate::log::SkipReason;
use crate::time::Timestamp;

/// Where a candidate came from.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOrigin {
    /// A user-authored rule whose trigger matched.
    Rule {
        id: RuleId,
        name: String,
        created_at: Timestamp,
        min_savings: Option<f64>,
    },
    /// Daily-limit enforcement.
    LimitMonitor,
    /// Active-hours schedule enforcement.
    ScheduleMonitor,
}

impl CandidateOrigin {
    /// The rule behind this candidate, if any.
    #[must_use]
    pub fn rule_id(&self) -> Option<RuleId> {
        match self {
            Self::Rule { id, .. } => Some(*id),
            Self::LimitMonitor | Self::ScheduleMonitor => None,
        }
    }
}

/// One proposed per-device state change, before conflict resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateAction {
    pub device_id: DeviceId,
    /// Desired on/off state for the device.
    pub turn_on: bool,
    /// Lower wins when several candidates target the same device.
    pub priority: i32,
    pub origin: CandidateOrigin,
    pub reasoning: String,
}

impl CandidateAction {
    /// Sort key for conflict resolution: priority, then creation order,
    /// then rule id. Monitors sort before any rule of equal priority.
    #[must_use]
    pub fn sort_key(&self) -> (i32, Option<Timestamp>, Option<RuleId>) {
        match &self.origin {
            CandidateOrigin::Rule { id, created_at, .. } => {
                (self.priority, Some(*created_at), Some(*id))
            }
            CandidateOrigin::LimitMonitor | CandidateOrigin::ScheduleMonitor => {
                (self.priority, None, None)
            }
        }
    }
}

/// The resolver's ruling on one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Execute,
    Skip(SkipReason),
}

/// A resolved candidate, ready for the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub candidate: CandidateAction,
    pub verdict: Verdict,
}

impl Decision {
    #[must_use]
    pub fn execute(candidate: CandidateAction) -> Self {
        Self {
            candidate,
            verdict: Verdict::Execute,
        }
    }

    #[must_use]
    pub fn skip(candidate: CandidateAction, reason: SkipReason) -> Self {
        Self {
            candidate,
            verdict: Verdict::Skip(reason),
        }
    }
}
