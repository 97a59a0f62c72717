//! Enforcement monitors — daily energy caps and active-hours ceilings.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{NaiveDate, NaiveDateTime};

use homeflux_domain::decision::{CandidateAction, CandidateOrigin};
use homeflux_domain::device::DeviceSnapshot;
use homeflux_domain::id::DeviceId;
use homeflux_domain::usage::UsageSnapshot;

/// Watches per-device automation settings and emits enforcement candidates.
///
/// Monitor candidates carry `i32::MIN` priority so enforcement always wins
/// a device conflict against user rules.
///
/// The daily cap fires once per device per local day: the latch survives a
/// manual re-enable of the device and resets at midnight rollover. The
/// schedule ceiling is stateless; it only ever turns devices *off* outside
/// their window, never on when the window opens.
#[derive(Default)]
pub struct LimitMonitor {
    limited_on: Mutex<HashMap<DeviceId, NaiveDate>>,
}

impl LimitMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Daily-cap candidates, checked against the latest accumulated usage.
    #[must_use]
    pub fn limit_candidates(
        &self,
        devices: &[DeviceSnapshot],
        usage: &UsageSnapshot,
        today: NaiveDate,
    ) -> Vec<CandidateAction> {
        let mut limited_on = self
            .limited_on
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut candidates = Vec::new();

        for device in devices {
            let limit = &device.settings.daily_limit;
            if !limit.enabled {
                continue;
            }
            let Some(reading) = usage.device(device.id) else {
                continue;
            };
            if reading.accumulated_kwh_today < limit.threshold_kwh {
                continue;
            }
            if limited_on.get(&device.id) == Some(&today) {
                continue;
            }
            limited_on.insert(device.id, today);
            candidates.push(CandidateAction {
                device_id: device.id,
                turn_on: false,
                priority: i32::MIN,
                origin: CandidateOrigin::LimitMonitor,
                reasoning: format!(
                    "daily limit reached: {:.2} kWh used of {:.2} kWh allowed",
                    reading.accumulated_kwh_today, limit.threshold_kwh
                ),
            });
        }
        candidates
    }

    /// Active-hours candidates for devices running outside their window.
    #[must_use]
    pub fn schedule_candidates(
        &self,
        devices: &[DeviceSnapshot],
        local_now: NaiveDateTime,
    ) -> Vec<CandidateAction> {
        devices
            .iter()
            .filter(|device| {
                let schedule = &device.settings.schedule;
                device.is_active && schedule.enabled && !schedule.contains(local_now.time())
            })
            .map(|device| CandidateAction {
                device_id: device.id,
                turn_on: false,
                priority: i32::MIN,
                origin: CandidateOrigin::ScheduleMonitor,
                reasoning: format!(
                    "outside active hours {}..{}",
                    device.settings.schedule.start, device.settings.schedule.end
                ),
            })
            .collect()
    }
}
