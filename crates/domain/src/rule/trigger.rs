//! Trigger — the condition that makes a rule eligible to fire.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::DeviceId;
use crate::usage::UsageSnapshot;

/// Describes when a rule becomes eligible to fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Fires at an exact local minute on the listed days of the week.
    Time {
        hour: u32,
        minute: u32,
        days: Vec<Weekday>,
    },
    /// Fires while a monitored power reading sits past a threshold.
    UsageThreshold {
        target: ThresholdTarget,
        threshold_w: f64,
        direction: ThresholdDirection,
    },
}

/// What a usage-threshold trigger watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThresholdTarget {
    /// One device's current draw.
    Device { device_id: DeviceId },
    /// The whole home's summed draw.
    HomeTotal,
}

/// Which side of the threshold the trigger fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdDirection {
    Above,
    Below,
}

impl Trigger {
    /// Check schedule/threshold invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the schedule time is out of range,
    /// the day list is empty, or the threshold is not positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Time { hour, minute, days } => {
                if *hour > 23 || *minute > 59 {
                    return Err(ValidationError::TimeOutOfRange {
                        hour: *hour,
                        minute: *minute,
                    });
                }
                if days.is_empty() {
                    return Err(ValidationError::NoScheduleDays);
                }
                Ok(())
            }
            Self::UsageThreshold { threshold_w, .. } => {
                if *threshold_w <= 0.0 {
                    return Err(ValidationError::NonPositiveThreshold);
                }
                Ok(())
            }
        }
    }

    /// Whether a time trigger matches this exact local minute.
    ///
    /// Usage-threshold triggers never match the clock; they are driven by
    /// [`matches_usage`](Self::matches_usage).
    #[must_use]
    pub fn matches_minute(&self, now: NaiveDateTime) -> bool {
        match self {
            Self::Time { hour, minute, days } => {
                days.contains(&now.weekday())
                    && now.hour() == *hour
                    && now.minute() == *minute
            }
            Self::UsageThreshold { .. } => false,
        }
    }

    /// Whether a usage-threshold trigger is satisfied by the latest readings.
    #[must_use]
    pub fn matches_usage(&self, snapshot: &UsageSnapshot) -> bool {
        match self {
            Self::Time { .. } => false,
            Self::UsageThreshold {
                target,
                threshold_w,
                direction,
            } => {
                let value = match target {
                    ThresholdTarget::Device { device_id } => {
                        snapshot.device_power_w(*device_id)
                    }
                    ThresholdTarget::HomeTotal => snapshot.home_total_w(),
                };
                match direction {
                    ThresholdDirection::Above => value >= *threshold_w,
                    ThresholdDirection::Below => value <= *threshold_w,
                }
            }
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Time { hour, minute, .. } => write!(f, "time({hour:02}:{minute:02})"),
            Self::UsageThreshold {
                threshold_w,
                direction,
                ..
            } => {
                let dir = match direction {
                    ThresholdDirection::Above => "above",
                    ThresholdDirection::Below => "below",
                };
                write!(f, "usage_threshold({dir} {threshold_w}W)")
            }
        }
    }
}
