//! Usage updates — live readings consumed from the measurement pipeline.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::id::DeviceId;
use crate::time::Timestamp;

/// One reading from the usage-measurement pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageUpdate {
    pub device_id: DeviceId,
    pub current_power_w: f64,
    pub accumulated_kwh_today: f64,
    pub timestamp: Timestamp,
}

/// Latest known reading per device, maintained by the engine worker.
#[derive(Debug, Clone, Default)]
pub struct UsageSnapshot {
    readings: HashMap<DeviceId, UsageUpdate>,
}

impl UsageSnapshot {
    /// Record a reading, replacing any previous one for the same device.
    pub fn record(&mut self, update: UsageUpdate) {
        self.readings.insert(update.device_id, update);
    }

    /// Latest reading for a device, if any has been seen.
    #[must_use]
    pub fn device(&self, id: DeviceId) -> Option<&UsageUpdate> {
        self.readings.get(&id)
    }

    /// Current draw of one device in watts; zero when unseen.
    #[must_use]
    pub fn device_power_w(&self, id: DeviceId) -> f64 {
        self.readings.get(&id).map_or(0.0, |u| u.current_power_w)
    }

    /// Sum of the latest draw across all devices, in watts.
    #[must_use]
    pub fn home_total_w(&self) -> f64 {
        self.readings.values().map(|u| u.current_power_w).sum()
    }
}
