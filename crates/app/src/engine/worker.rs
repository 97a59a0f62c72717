//! Engine worker — the single consumer driving passes for one home.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use homeflux_domain::error::HomeFluxError;
use homeflux_domain::id::HomeId;
use homeflux_domain::time;
use homeflux_domain::usage::{UsageSnapshot, UsageUpdate};

use crate::engine::evaluator::{Pass, TriggerEvaluator};
use crate::engine::executor::ActionExecutor;
use crate::engine::limit_monitor::LimitMonitor;
use crate::engine::locks::DeviceLocks;
use crate::engine::resolver::ConflictResolver;
use crate::ports::{DeviceGateway, ExecutionLog, RuleRepository};

/// One engine worker per home.
///
/// The worker is the only consumer of its stimuli: a clock interval for
/// time triggers and schedule enforcement, and the usage bus for threshold
/// triggers and daily-limit enforcement. A full pass (evaluate → resolve →
/// execute) completes before the next stimulus is taken, so passes for one
/// home never interleave. Missed ticks are skipped, never backfilled.
pub struct EngineWorker<R, G, L> {
    home_id: HomeId,
    rules: R,
    gateway: G,
    executor: ActionExecutor<G, L, R>,
    monitor: LimitMonitor,
    usage_rx: broadcast::Receiver<UsageUpdate>,
    usage: UsageSnapshot,
    tick: Duration,
    last_minute: Option<(NaiveDate, u32, u32)>,
}

impl<R, G, L> EngineWorker<R, G, L>
where
    R: RuleRepository + Clone,
    G: DeviceGateway + Clone,
    L: ExecutionLog,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        home_id: HomeId,
        rules: R,
        gateway: G,
        log: L,
        locks: Arc<DeviceLocks>,
        usage_rx: broadcast::Receiver<UsageUpdate>,
        tick: Duration,
        action_timeout: Duration,
    ) -> Self {
        let executor =
            ActionExecutor::new(gateway.clone(), log, rules.clone(), locks, action_timeout);
        Self {
            home_id,
            rules,
            gateway,
            executor,
            monitor: LimitMonitor::new(),
            usage_rx,
            usage: UsageSnapshot::default(),
            tick,
            last_minute: None,
        }
    }

    /// Run until the usage bus closes.
    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(home_id = %self.home_id, "engine worker started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let local_now = time::local_now();
                    if self.minute_already_evaluated(local_now) {
                        continue;
                    }
                    if let Err(error) = self.run_pass(Pass::Tick, local_now).await {
                        tracing::error!(home_id = %self.home_id, %error, "engine pass failed");
                    }
                }
                received = self.usage_rx.recv() => match received {
                    Ok(update) => {
                        self.usage.record(update);
                        if let Err(error) =
                            self.run_pass(Pass::Usage, time::local_now()).await
                        {
                            tracing::error!(home_id = %self.home_id, %error, "engine pass failed");
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(
                            home_id = %self.home_id,
                            missed,
                            "usage bus lagged; readings dropped",
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
        tracing::info!(home_id = %self.home_id, "engine worker stopped");
    }

    /// Record a reading without going through the bus.
    pub fn record_usage(&mut self, update: UsageUpdate) {
        self.usage.record(update);
    }

    /// Run one full pass: evaluate, resolve, execute, log.
    ///
    /// # Errors
    ///
    /// Propagates repository, gateway and log failures; per-device
    /// execution failures are recorded in log entries instead.
    pub async fn run_pass(
        &mut self,
        pass: Pass,
        local_now: NaiveDateTime,
    ) -> Result<(), HomeFluxError> {
        let rules = self.rules.get_enabled(self.home_id).await?;
        let devices = self.gateway.devices(self.home_id).await?;
        let tariff_rate = self.gateway.tariff_rate(self.home_id).await?;

        let mut candidates =
            TriggerEvaluator::candidates(&rules, &devices, &self.usage, local_now, pass);
        match pass {
            Pass::Tick => {
                candidates.extend(self.monitor.schedule_candidates(&devices, local_now));
            }
            Pass::Usage => {
                candidates.extend(self.monitor.limit_candidates(
                    &devices,
                    &self.usage,
                    local_now.date(),
                ));
            }
        }
        if candidates.is_empty() {
            return Ok(());
        }

        let decisions = ConflictResolver::resolve(candidates, &devices, tariff_rate);
        let entries = self
            .executor
            .apply(self.home_id, decisions, &devices, tariff_rate)
            .await?;
        tracing::debug!(
            home_id = %self.home_id,
            entries = entries.len(),
            executed = entries.iter().filter(|e| e.executed).count(),
            "engine pass complete",
        );
        Ok(())
    }

    /// Time triggers fire at most once per wall-clock minute, even when
    /// ticks land twice inside the same minute.
    fn minute_already_evaluated(&mut self, local_now: NaiveDateTime) -> bool {
        let minute = (local_now.date(), local_now.hour(), local_now.minute());
        if self.last_minute == Some(minute) {
            return true;
        }
        self.last_minute = Some(minute);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;

    use chrono::Weekday;
    use homeflux_domain::device::{AutomationSettings, DailyLimit, DeviceKind, DeviceSnapshot};
    use homeflux_domain::id::{DeviceId, LogEntryId, RuleId};
    use homeflux_domain::log::{ExecutionLogEntry, SkipReason};
    use homeflux_domain::rule::{
        ActionKind, AutomationRule, RuleAction, ThresholdDirection, ThresholdTarget, Trigger,
    };
    use homeflux_domain::time::Timestamp;

    // ------------------------------------------------------------------------
    // In-memory fakes
    // ------------------------------------------------------------------------

    struct FakeGateway {
        home_id: HomeId,
        fleet: Vec<DeviceSnapshot>,
        states: Mutex<HashMap<DeviceId, bool>>,
    }

    impl FakeGateway {
        fn with_fleet(home_id: HomeId, fleet: Vec<DeviceSnapshot>) -> Self {
            Self {
                home_id,
                fleet,
                states: Mutex::new(HashMap::new()),
            }
        }

        fn state_of(&self, device_id: DeviceId) -> Option<bool> {
            self.states.lock().unwrap().get(&device_id).copied()
        }
    }

    impl DeviceGateway for &FakeGateway {
        fn devices(
            &self,
            home_id: HomeId,
        ) -> impl Future<Output = Result<Vec<DeviceSnapshot>, HomeFluxError>> + Send {
            let states = self.states.lock().unwrap();
            let fleet: Vec<_> = if home_id == self.home_id {
                self.fleet
                    .iter()
                    .map(|d| {
                        let mut snapshot = d.clone();
                        if let Some(active) = states.get(&d.id) {
                            snapshot.is_active = *active;
                        }
                        snapshot
                    })
                    .collect()
            } else {
                Vec::new()
            };
            async { Ok(fleet) }
        }

        fn set_device_state(
            &self,
            device_id: DeviceId,
            active: bool,
        ) -> impl Future<Output = Result<(), HomeFluxError>> + Send {
            self.states.lock().unwrap().insert(device_id, active);
            async { Ok(()) }
        }

        fn tariff_rate(
            &self,
            _home_id: HomeId,
        ) -> impl Future<Output = Result<f64, HomeFluxError>> + Send {
            async { Ok(0.25) }
        }
    }

    #[derive(Default)]
    struct FakeLog {
        entries: Mutex<Vec<ExecutionLogEntry>>,
    }

    impl ExecutionLog for &FakeLog {
        fn append(
            &self,
            entry: ExecutionLogEntry,
        ) -> impl Future<Output = Result<ExecutionLogEntry, HomeFluxError>> + Send {
            self.entries.lock().unwrap().push(entry.clone());
            async { Ok(entry) }
        }

        fn get_by_id(
            &self,
            id: LogEntryId,
        ) -> impl Future<Output = Result<Option<ExecutionLogEntry>, HomeFluxError>> + Send {
            let found = self
                .entries
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.id == id)
                .cloned();
            async { Ok(found) }
        }

        fn recent(
            &self,
            _home_id: HomeId,
            limit: usize,
        ) -> impl Future<Output = Result<Vec<ExecutionLogEntry>, HomeFluxError>> + Send {
            let mut entries: Vec<_> = self.entries.lock().unwrap().clone();
            entries.reverse();
            entries.truncate(limit);
            async { Ok(entries) }
        }

        fn mark_undone(
            &self,
            id: LogEntryId,
            at: Timestamp,
        ) -> impl Future<Output = Result<ExecutionLogEntry, HomeFluxError>> + Send {
            let mut entries = self.entries.lock().unwrap();
            let result = entries
                .iter_mut()
                .find(|e| e.id == id)
                .map(|e| {
                    e.user_response =
                        Some(homeflux_domain::log::UserResponse::Undone { at });
                    e.clone()
                })
                .ok_or_else(|| {
                    homeflux_domain::error::NotFoundError {
                        entity: "LogEntry",
                        id: id.to_string(),
                    }
                    .into()
                });
            async { result }
        }
    }

    #[derive(Default)]
    struct FakeRuleRepo {
        store: Mutex<HashMap<RuleId, AutomationRule>>,
    }

    impl FakeRuleRepo {
        fn insert(&self, rule: AutomationRule) {
            self.store.lock().unwrap().insert(rule.id, rule);
        }
    }

    impl RuleRepository for &FakeRuleRepo {
        fn create(
            &self,
            rule: AutomationRule,
        ) -> impl Future<Output = Result<AutomationRule, HomeFluxError>> + Send {
            self.store.lock().unwrap().insert(rule.id, rule.clone());
            async { Ok(rule) }
        }

        fn get_by_id(
            &self,
            id: RuleId,
        ) -> impl Future<Output = Result<Option<AutomationRule>, HomeFluxError>> + Send {
            let found = self.store.lock().unwrap().get(&id).cloned();
            async { Ok(found) }
        }

        fn get_all(
            &self,
            home_id: HomeId,
        ) -> impl Future<Output = Result<Vec<AutomationRule>, HomeFluxError>> + Send {
            let rules: Vec<_> = self
                .store
                .lock()
                .unwrap()
                .values()
                .filter(|r| r.home_id == home_id)
                .cloned()
                .collect();
            async { Ok(rules) }
        }

        fn get_enabled(
            &self,
            home_id: HomeId,
        ) -> impl Future<Output = Result<Vec<AutomationRule>, HomeFluxError>> + Send {
            let rules: Vec<_> = self
                .store
                .lock()
                .unwrap()
                .values()
                .filter(|r| r.home_id == home_id && r.enabled)
                .cloned()
                .collect();
            async { Ok(rules) }
        }

        fn update(
            &self,
            rule: AutomationRule,
        ) -> impl Future<Output = Result<AutomationRule, HomeFluxError>> + Send {
            self.store.lock().unwrap().insert(rule.id, rule.clone());
            async { Ok(rule) }
        }

        fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), HomeFluxError>> + Send {
            self.store.lock().unwrap().remove(&id);
            async { Ok(()) }
        }
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn device(home_id: HomeId, active: bool) -> DeviceSnapshot {
        DeviceSnapshot {
            id: DeviceId::new(),
            home_id,
            name: "Heater".to_string(),
            kind: DeviceKind::Hvac,
            essential: false,
            is_active: active,
            current_power_w: 2000.0,
            rated_power_w: 2000.0,
            settings: AutomationSettings::default(),
        }
    }

    fn monday_22() -> NaiveDateTime {
        // 2025-01-06 is a Monday.
        NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(22, 0, 0)
            .unwrap()
    }

    fn worker<'a>(
        home_id: HomeId,
        rules: &'a FakeRuleRepo,
        gateway: &'a FakeGateway,
        log: &'a FakeLog,
    ) -> EngineWorker<&'a FakeRuleRepo, &'a FakeGateway, &'a FakeLog> {
        let (_tx, rx) = broadcast::channel(16);
        EngineWorker::new(
            home_id,
            rules,
            gateway,
            log,
            Arc::new(DeviceLocks::new()),
            rx,
            Duration::from_secs(60),
            Duration::from_millis(200),
        )
    }

    fn bedtime_rule(home_id: HomeId, device_id: DeviceId, priority: i32) -> AutomationRule {
        AutomationRule::builder()
            .home_id(home_id)
            .name(format!("Bedtime p{priority}"))
            .priority(priority)
            .trigger(Trigger::Time {
                hour: 22,
                minute: 0,
                days: vec![Weekday::Mon],
            })
            .action(RuleAction {
                kind: ActionKind::TurnOff,
                devices: vec![device_id],
            })
            .build()
            .unwrap()
    }

    // ------------------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn should_execute_time_rule_on_tick_pass() {
        let home_id = HomeId::new();
        let heater = device(home_id, true);
        let gateway = FakeGateway::with_fleet(home_id, vec![heater.clone()]);
        let (rules, log) = (FakeRuleRepo::default(), FakeLog::default());
        let rule = bedtime_rule(home_id, heater.id, 100);
        rules.insert(rule.clone());

        let mut worker = worker(home_id, &rules, &gateway, &log);
        worker.run_pass(Pass::Tick, monday_22()).await.unwrap();

        assert_eq!(gateway.state_of(heater.id), Some(false));
        let entries = log.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].executed);
        assert_eq!(entries[0].rule.as_ref().unwrap().id, rule.id);
    }

    #[tokio::test]
    async fn should_skip_no_op_on_a_second_identical_pass() {
        let home_id = HomeId::new();
        let heater = device(home_id, true);
        let gateway = FakeGateway::with_fleet(home_id, vec![heater.clone()]);
        let (rules, log) = (FakeRuleRepo::default(), FakeLog::default());
        rules.insert(bedtime_rule(home_id, heater.id, 100));

        let mut worker = worker(home_id, &rules, &gateway, &log);
        worker.run_pass(Pass::Tick, monday_22()).await.unwrap();
        worker.run_pass(Pass::Tick, monday_22()).await.unwrap();

        let entries = log.entries.lock().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].executed);
        assert!(!entries[1].executed);
        assert_eq!(entries[1].skip_reason, Some(SkipReason::NoOp));
    }

    #[tokio::test]
    async fn should_execute_only_the_lowest_priority_rule_for_a_device() {
        let home_id = HomeId::new();
        let heater = device(home_id, true);
        let gateway = FakeGateway::with_fleet(home_id, vec![heater.clone()]);
        let (rules, log) = (FakeRuleRepo::default(), FakeLog::default());
        let winner = bedtime_rule(home_id, heater.id, 1);
        rules.insert(winner.clone());
        rules.insert(bedtime_rule(home_id, heater.id, 200));

        let mut worker = worker(home_id, &rules, &gateway, &log);
        worker.run_pass(Pass::Tick, monday_22()).await.unwrap();

        let entries = log.entries.lock().unwrap();
        assert_eq!(entries.len(), 2);
        let executed: Vec<_> = entries.iter().filter(|e| e.executed).collect();
        assert_eq!(executed.len(), 1);
        assert_eq!(executed[0].rule.as_ref().unwrap().id, winner.id);
        assert!(entries
            .iter()
            .any(|e| e.skip_reason == Some(SkipReason::Superseded)));

        // Both rules were triggered; only the winner succeeded.
        let store = rules.store.lock().unwrap();
        for rule in store.values() {
            assert_eq!(rule.stats.trigger_count, 1);
            assert_eq!(rule.stats.success_count, u64::from(rule.id == winner.id));
        }
    }

    #[tokio::test]
    async fn should_enforce_daily_limit_once_per_day_on_usage_passes() {
        let home_id = HomeId::new();
        let mut heater = device(home_id, true);
        heater.settings.daily_limit = DailyLimit {
            enabled: true,
            threshold_kwh: 5.0,
        };
        let gateway = FakeGateway::with_fleet(home_id, vec![heater.clone()]);
        let (rules, log) = (FakeRuleRepo::default(), FakeLog::default());

        let mut worker = worker(home_id, &rules, &gateway, &log);
        worker.record_usage(UsageUpdate {
            device_id: heater.id,
            current_power_w: 2000.0,
            accumulated_kwh_today: 5.2,
            timestamp: time::now(),
        });

        worker.run_pass(Pass::Usage, monday_22()).await.unwrap();
        assert_eq!(gateway.state_of(heater.id), Some(false));

        // User turns the heater back on; the latch holds for the day.
        gateway.states.lock().unwrap().insert(heater.id, true);
        worker.run_pass(Pass::Usage, monday_22()).await.unwrap();
        assert_eq!(gateway.state_of(heater.id), Some(true));

        let entries = log.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].rule.is_none());
    }

    #[tokio::test]
    async fn should_fire_usage_threshold_rule_on_usage_pass() {
        let home_id = HomeId::new();
        let heater = device(home_id, true);
        let gateway = FakeGateway::with_fleet(home_id, vec![heater.clone()]);
        let (rules, log) = (FakeRuleRepo::default(), FakeLog::default());
        rules.insert(
            AutomationRule::builder()
                .home_id(home_id)
                .name("High draw guard")
                .trigger(Trigger::UsageThreshold {
                    target: ThresholdTarget::Device {
                        device_id: heater.id,
                    },
                    threshold_w: 1500.0,
                    direction: ThresholdDirection::Above,
                })
                .action(RuleAction {
                    kind: ActionKind::TurnOff,
                    devices: vec![heater.id],
                })
                .build()
                .unwrap(),
        );

        let mut worker = worker(home_id, &rules, &gateway, &log);
        worker.record_usage(UsageUpdate {
            device_id: heater.id,
            current_power_w: 1800.0,
            accumulated_kwh_today: 1.0,
            timestamp: time::now(),
        });
        worker.run_pass(Pass::Usage, monday_22()).await.unwrap();

        assert_eq!(gateway.state_of(heater.id), Some(false));
    }

    #[tokio::test]
    async fn should_not_evaluate_rules_for_another_home() {
        let home_id = HomeId::new();
        let heater = device(home_id, true);
        let gateway = FakeGateway::with_fleet(home_id, vec![heater.clone()]);
        let (rules, log) = (FakeRuleRepo::default(), FakeLog::default());
        rules.insert(bedtime_rule(HomeId::new(), heater.id, 100));

        let mut worker = worker(home_id, &rules, &gateway, &log);
        worker.run_pass(Pass::Tick, monday_22()).await.unwrap();

        assert_eq!(gateway.state_of(heater.id), None);
        assert!(log.entries.lock().unwrap().is_empty());
    }

    #[test]
    fn should_guard_against_double_evaluation_of_the_same_minute() {
        let home_id = HomeId::new();
        let gateway = FakeGateway::with_fleet(home_id, vec![]);
        let (rules, log) = (FakeRuleRepo::default(), FakeLog::default());
        let mut worker = worker(home_id, &rules, &gateway, &log);

        assert!(!worker.minute_already_evaluated(monday_22()));
        assert!(worker.minute_already_evaluated(monday_22()));
        assert!(!worker.minute_already_evaluated(monday_22() + chrono::Duration::minutes(1)));
    }
}
