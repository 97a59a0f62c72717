//! Action execution — applying resolved decisions to real devices.

use std::sync::Arc;
use std::time::Duration;

use homeflux_domain::decision::{CandidateAction, CandidateOrigin, Decision, Verdict};
use homeflux_domain::device::DeviceSnapshot;
use homeflux_domain::error::HomeFluxError;
use homeflux_domain::id::HomeId;
use homeflux_domain::log::{
    EstimatedImpact, ExecutionLogEntry, LoggedAction, RuleRef, SkipReason,
};
use homeflux_domain::rule::ActionKind;

use crate::engine::locks::DeviceLocks;
use crate::ports::{DeviceGateway, ExecutionLog, RuleRepository};

/// Applies resolved decisions through the device gateway.
///
/// Exactly one log entry is appended per decision. Gateway failures and
/// timeouts become `device update failed` entries rather than errors; a
/// failed action is never retried within the pass. After each entry the
/// owning rule's stats are bumped.
pub struct ActionExecutor<G, L, R> {
    gateway: G,
    log: L,
    rules: R,
    locks: Arc<DeviceLocks>,
    action_timeout: Duration,
}

impl<G, L, R> ActionExecutor<G, L, R>
where
    G: DeviceGateway,
    L: ExecutionLog,
    R: RuleRepository,
{
    pub fn new(gateway: G, log: L, rules: R, locks: Arc<DeviceLocks>, action_timeout: Duration) -> Self {
        Self {
            gateway,
            log,
            rules,
            locks,
            action_timeout,
        }
    }

    /// Apply every decision of a pass, appending one log entry each.
    ///
    /// # Errors
    ///
    /// Returns an error only when the log or rule repository fails; device
    /// failures are recorded in the entries themselves.
    pub async fn apply(
        &self,
        home_id: HomeId,
        decisions: Vec<Decision>,
        devices: &[DeviceSnapshot],
        tariff_rate: f64,
    ) -> Result<Vec<ExecutionLogEntry>, HomeFluxError> {
        let mut entries = Vec::with_capacity(decisions.len());
        for decision in decisions {
            let entry = self
                .apply_one(home_id, decision, devices, tariff_rate)
                .await;
            let entry = self.log.append(entry).await?;
            self.bump_stats(&entry).await?;
            entries.push(entry);
        }
        Ok(entries)
    }

    async fn apply_one(
        &self,
        home_id: HomeId,
        decision: Decision,
        devices: &[DeviceSnapshot],
        tariff_rate: f64,
    ) -> ExecutionLogEntry {
        let Decision { candidate, verdict } = decision;
        let rule = rule_ref(&candidate.origin);
        let action = LoggedAction {
            kind: if candidate.turn_on {
                ActionKind::TurnOn
            } else {
                ActionKind::TurnOff
            },
            devices: vec![candidate.device_id],
        };

        match verdict {
            Verdict::Skip(reason) => ExecutionLogEntry::skipped(
                home_id,
                rule,
                action,
                reason,
                format!("{}; {reason}", candidate.reasoning),
            ),
            Verdict::Execute => {
                let lock = self.locks.for_device(candidate.device_id);
                let _guard = lock.lock().await;

                let result = tokio::time::timeout(
                    self.action_timeout,
                    self.gateway.set_device_state(candidate.device_id, candidate.turn_on),
                )
                .await;

                match result {
                    Ok(Ok(())) => {
                        let savings_per_hour = if candidate.turn_on {
                            0.0
                        } else {
                            devices
                                .iter()
                                .find(|d| d.id == candidate.device_id)
                                .map_or(0.0, |d| d.estimated_savings_per_hour(tariff_rate))
                        };
                        ExecutionLogEntry::executed(
                            home_id,
                            rule,
                            action,
                            candidate.reasoning,
                            EstimatedImpact {
                                affected_devices: 1,
                                savings_per_hour,
                            },
                        )
                    }
                    Ok(Err(error)) => {
                        tracing::warn!(
                            device_id = %candidate.device_id,
                            %error,
                            "device update failed",
                        );
                        ExecutionLogEntry::skipped(
                            home_id,
                            rule,
                            action,
                            SkipReason::DeviceUpdateFailed,
                            format!("{}; {error}", candidate.reasoning),
                        )
                    }
                    Err(_elapsed) => {
                        tracing::warn!(
                            device_id = %candidate.device_id,
                            timeout_ms = self.action_timeout.as_millis() as u64,
                            "device update timed out",
                        );
                        ExecutionLogEntry::skipped(
                            home_id,
                            rule,
                            action,
                            SkipReason::DeviceUpdateFailed,
                            format!("{}; timed out", candidate.reasoning),
                        )
                    }
                }
            }
        }
    }

    /// Bump `trigger_count` (and `success_count` on execution) for the rule
    /// behind an entry. Monitor and mode entries carry no rule.
    async fn bump_stats(&self, entry: &ExecutionLogEntry) -> Result<(), HomeFluxError> {
        let Some(rule_ref) = &entry.rule else {
            return Ok(());
        };
        // The rule may have been deleted between evaluation and logging.
        if let Some(mut rule) = self.rules.get_by_id(rule_ref.id).await? {
            rule.stats.record(entry.executed);
            self.rules.update(rule).await?;
        }
        Ok(())
    }
}

fn rule_ref(origin: &CandidateOrigin) -> Option<RuleRef> {
    match origin {
        CandidateOrigin::Rule { id, name, .. } => Some(RuleRef {
            id: *id,
            name: name.clone(),
        }),
        CandidateOrigin::LimitMonitor | CandidateOrigin::ScheduleMonitor => None,
    }
}
