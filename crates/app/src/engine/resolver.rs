//! Conflict resolution — at most one action executes per device per pass.

use std::collections::{BTreeMap, HashMap};

use homeflux_domain::decision::{CandidateAction, CandidateOrigin, Decision};
use homeflux_domain::device::DeviceSnapshot;
use homeflux_domain::id::DeviceId;
use homeflux_domain::log::SkipReason;

/// Stateless conflict resolver.
///
/// Groups candidates by device, picks the winner by the candidate sort key
/// (lowest priority first, monitors outrank every rule), and rules on the
/// winner's execution. Every candidate receives a verdict; none are dropped.
pub struct ConflictResolver;

impl ConflictResolver {
    #[must_use]
    pub fn resolve(
        candidates: Vec<CandidateAction>,
        devices: &[DeviceSnapshot],
        tariff_rate: f64,
    ) -> Vec<Decision> {
        let by_id: HashMap<DeviceId, &DeviceSnapshot> =
            devices.iter().map(|d| (d.id, d)).collect();

        // BTreeMap keeps the output order stable across passes.
        let mut groups: BTreeMap<DeviceId, Vec<CandidateAction>> = BTreeMap::new();
        for candidate in candidates {
            groups.entry(candidate.device_id).or_default().push(candidate);
        }

        let mut decisions = Vec::new();
        for (device_id, mut group) in groups {
            group.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
            let mut group = group.into_iter();
            if let Some(winner) = group.next() {
                decisions.push(Self::judge(winner, by_id.get(&device_id).copied(), tariff_rate));
            }
            for loser in group {
                decisions.push(Decision::skip(loser, SkipReason::Superseded));
            }
        }
        decisions
    }

    /// Rule on the winning candidate for one device.
    fn judge(
        winner: CandidateAction,
        device: Option<&DeviceSnapshot>,
        tariff_rate: f64,
    ) -> Decision {
        let Some(device) = device else {
            // The target device is gone from the fleet.
            return Decision::skip(winner, SkipReason::DeviceUpdateFailed);
        };

        if device.is_active == winner.turn_on {
            return Decision::skip(winner, SkipReason::NoOp);
        }

        if !winner.turn_on
            && let CandidateOrigin::Rule {
                min_savings: Some(min_savings),
                ..
            } = &winner.origin
            && device.estimated_savings_per_hour(tariff_rate) < *min_savings
        {
            return Decision::skip(winner, SkipReason::InsufficientSavings);
        }

        Decision::execute(winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homeflux_domain::decision::Verdict;
    use homeflux_domain::device::{AutomationSettings, DeviceKind};
    use homeflux_domain::id::{HomeId, RuleId};
    use homeflux_domain::time;

    fn device(active: bool, rated_power_w: f64) -> DeviceSnapshot {
        DeviceSnapshot {
            id: DeviceId::new(),
            home_id: HomeId::new(),
            name: "Heater".to_string(),
            kind: DeviceKind::Hvac,
            essential: false,
            is_active: active,
            current_power_w: if active { rated_power_w } else { 0.0 },
            rated_power_w,
            settings: AutomationSettings::default(),
        }
    }

    fn rule_candidate(
        device_id: DeviceId,
        priority: i32,
        min_savings: Option<f64>,
    ) -> CandidateAction {
        CandidateAction {
            device_id,
            turn_on: false,
            priority,
            origin: CandidateOrigin::Rule {
                id: RuleId::new(),
                name: format!("rule p{priority}"),
                created_at: time::now(),
                min_savings,
            },
            reasoning: String::new(),
        }
    }

    fn verdicts_by_priority(decisions: &[Decision]) -> Vec<(i32, Verdict)> {
        decisions
            .iter()
            .map(|d| (d.candidate.priority, d.verdict.clone()))
            .collect()
    }

    #[test]
    fn should_execute_only_the_lowest_priority_candidate_per_device() {
        let target = device(true, 2000.0);
        let candidates = vec![
            rule_candidate(target.id, 200, None),
            rule_candidate(target.id, 1, None),
            rule_candidate(target.id, 100, None),
        ];

        let decisions =
            ConflictResolver::resolve(candidates, std::slice::from_ref(&target), 0.25);

        let verdicts = verdicts_by_priority(&decisions);
        assert_eq!(verdicts.len(), 3);
        assert_eq!(verdicts[0], (1, Verdict::Execute));
        assert_eq!(verdicts[1], (100, Verdict::Skip(SkipReason::Superseded)));
        assert_eq!(verdicts[2], (200, Verdict::Skip(SkipReason::Superseded)));
    }

    #[test]
    fn should_break_priority_ties_by_rule_creation_order() {
        let target = device(true, 2000.0);
        let older = CandidateAction {
            origin: CandidateOrigin::Rule {
                id: RuleId::new(),
                name: "older".to_string(),
                created_at: time::now() - chrono::Duration::hours(1),
                min_savings: None,
            },
            ..rule_candidate(target.id, 100, None)
        };
        let newer = rule_candidate(target.id, 100, None);

        let decisions = ConflictResolver::resolve(
            vec![newer, older],
            std::slice::from_ref(&target),
            0.25,
        );

        assert_eq!(decisions[0].verdict, Verdict::Execute);
        assert!(matches!(
            &decisions[0].candidate.origin,
            CandidateOrigin::Rule { name, .. } if name == "older"
        ));
    }

    #[test]
    fn should_let_monitors_outrank_every_rule() {
        let target = device(true, 2000.0);
        let monitor = CandidateAction {
            device_id: target.id,
            turn_on: false,
            priority: i32::MIN,
            origin: CandidateOrigin::LimitMonitor,
            reasoning: String::new(),
        };
        let rule = rule_candidate(target.id, i32::MIN, None);

        let decisions = ConflictResolver::resolve(
            vec![rule, monitor],
            std::slice::from_ref(&target),
            0.25,
        );

        assert_eq!(decisions[0].verdict, Verdict::Execute);
        assert_eq!(decisions[0].candidate.origin, CandidateOrigin::LimitMonitor);
    }

    #[test]
    fn should_skip_no_op_when_device_already_in_target_state() {
        let target = device(false, 2000.0);
        let decisions = ConflictResolver::resolve(
            vec![rule_candidate(target.id, 100, None)],
            std::slice::from_ref(&target),
            0.25,
        );

        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].verdict, Verdict::Skip(SkipReason::NoOp));
    }

    #[test]
    fn should_skip_when_estimated_savings_below_constraint() {
        // 100 W at 0.25/kWh saves 0.025/h, below the 0.10 floor.
        let target = device(true, 100.0);
        let decisions = ConflictResolver::resolve(
            vec![rule_candidate(target.id, 100, Some(0.10))],
            std::slice::from_ref(&target),
            0.25,
        );

        assert_eq!(
            decisions[0].verdict,
            Verdict::Skip(SkipReason::InsufficientSavings)
        );
    }

    #[test]
    fn should_execute_when_estimated_savings_meet_constraint() {
        // 2000 W at 0.25/kWh saves 0.50/h, above the 0.10 floor.
        let target = device(true, 2000.0);
        let decisions = ConflictResolver::resolve(
            vec![rule_candidate(target.id, 100, Some(0.10))],
            std::slice::from_ref(&target),
            0.25,
        );

        assert_eq!(decisions[0].verdict, Verdict::Execute);
    }

    #[test]
    fn should_resolve_devices_independently() {
        let first = device(true, 2000.0);
        let second = device(true, 2000.0);
        let decisions = ConflictResolver::resolve(
            vec![
                rule_candidate(first.id, 100, None),
                rule_candidate(second.id, 100, None),
            ],
            &[first, second],
            0.25,
        );

        assert_eq!(decisions.len(), 2);
        assert!(decisions.iter().all(|d| d.verdict == Verdict::Execute));
    }

    #[test]
    fn should_skip_when_target_device_is_unknown() {
        let decisions =
            ConflictResolver::resolve(vec![rule_candidate(DeviceId::new(), 100, None)], &[], 0.25);
        assert_eq!(
            decisions[0].verdict,
            Verdict::Skip(SkipReason::DeviceUpdateFailed)
        );
    }
}
