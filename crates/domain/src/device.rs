//! Device read-model — the narrow view of a device the engine works with.
//!
//! The device record itself is owned by the device subsystem; the engine
//! only sees this snapshot (on/off state, power draw, automation settings)
//! and writes back through the `DeviceGateway` port.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::id::{DeviceId, HomeId};

/// Broad device category, used by mode presets to pick their targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Hvac,
    Lighting,
    Entertainment,
    Appliance,
    WaterHeater,
    Other,
}

/// Point-in-time view of one device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub id: DeviceId,
    pub home_id: HomeId,
    pub name: String,
    pub kind: DeviceKind,
    /// Essential devices (fridge, security, …) are never touched by modes.
    pub essential: bool,
    /// Current on/off state.
    pub is_active: bool,
    /// Instantaneous draw in watts.
    pub current_power_w: f64,
    /// Nameplate power in watts, used for savings estimates.
    pub rated_power_w: f64,
    pub settings: AutomationSettings,
}

impl DeviceSnapshot {
    /// Estimated savings per hour of keeping this device off, at the given
    /// per-kWh tariff rate.
    #[must_use]
    pub fn estimated_savings_per_hour(&self, tariff_rate: f64) -> f64 {
        (self.rated_power_w / 1000.0) * tariff_rate
    }
}

/// Per-device automation settings, edited by the user on the device record.
///
/// The engine reads these and is the sole writer of the enforcement
/// side-effects; it never edits the settings themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutomationSettings {
    pub daily_limit: DailyLimit,
    pub schedule: ActiveHours,
}

/// Daily energy cap for one device.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyLimit {
    pub enabled: bool,
    pub threshold_kwh: f64,
}

/// Active-hours window: the device is expected to be off outside
/// `[start, end)`. The window is a ceiling, not an auto-on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveHours {
    pub enabled: bool,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ActiveHours {
    /// Whether `time` falls inside the `[start, end)` window.
    ///
    /// A window whose end precedes its start wraps past midnight
    /// (e.g. 22:00..06:00).
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= time && time < self.end
        } else {
            time >= self.start || time < self.end
        }
    }
}

impl Default for ActiveHours {
    fn default() -> Self {
        Self {
            enabled: false,
            start: NaiveTime::MIN,
            end: NaiveTime::MIN,
        }
    }
}
