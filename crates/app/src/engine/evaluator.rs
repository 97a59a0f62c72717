//! Trigger evaluation — turning matched rules into per-device candidates.

use chrono::NaiveDateTime;

use homeflux_domain::decision::{CandidateAction, CandidateOrigin};
use homeflux_domain::device::DeviceSnapshot;
use homeflux_domain::rule::{ActionKind, AutomationRule};
use homeflux_domain::usage::UsageSnapshot;

/// What prompted an engine pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Once-per-minute clock tick. Time and usage triggers both eligible.
    Tick,
    /// A fresh usage reading arrived. Usage triggers only, so a time
    /// trigger cannot fire twice inside its matching minute.
    Usage,
}

/// Stateless trigger evaluator.
///
/// Produces one [`CandidateAction`] per (rule, device) pair. `set_mode`
/// actions expand into the mode's computed device batch here, so every
/// mutation funnels through the same resolver and executor path.
pub struct TriggerEvaluator;

impl TriggerEvaluator {
    #[must_use]
    pub fn candidates(
        rules: &[AutomationRule],
        devices: &[DeviceSnapshot],
        usage: &UsageSnapshot,
        local_now: NaiveDateTime,
        pass: Pass,
    ) -> Vec<CandidateAction> {
        let mut candidates = Vec::new();

        for rule in rules {
            if !rule.enabled {
                continue;
            }
            let matched = match pass {
                Pass::Tick => {
                    rule.trigger.matches_minute(local_now) || rule.trigger.matches_usage(usage)
                }
                Pass::Usage => rule.trigger.matches_usage(usage),
            };
            if !matched {
                continue;
            }

            let origin = CandidateOrigin::Rule {
                id: rule.id,
                name: rule.name.clone(),
                created_at: rule.created_at,
                min_savings: rule.constraints.min_savings,
            };

            match rule.action.kind {
                ActionKind::SetMode { mode } => {
                    for device_id in mode.targets(devices) {
                        candidates.push(CandidateAction {
                            device_id,
                            turn_on: false,
                            priority: rule.priority,
                            origin: origin.clone(),
                            reasoning: format!(
                                "rule '{}' matched {} and applies mode {mode}",
                                rule.name, rule.trigger
                            ),
                        });
                    }
                }
                kind => {
                    for device_id in &rule.action.devices {
                        candidates.push(CandidateAction {
                            device_id: *device_id,
                            turn_on: kind.target_state(),
                            priority: rule.priority,
                            origin: origin.clone(),
                            reasoning: format!(
                                "rule '{}' matched {}",
                                rule.name, rule.trigger
                            ),
                        });
                    }
                }
            }
        }

        candidates
    }
}
