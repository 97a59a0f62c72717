//! Mode presets — fixed one-tap batches of device actions.
//!
//! Modes are few, fixed, and safety-relevant, so they live in a small
//! compiled table rather than user-editable rows. Each preset only ever
//! switches devices *off*; activating a mode with everything already off
//! is a no-op batch.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::device::{DeviceKind, DeviceSnapshot};
use crate::error::NotFoundError;
use crate::id::DeviceId;

/// Identifier of a built-in mode preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeId {
    Away,
    Sleep,
    Eco,
}

impl ModeId {
    /// The full catalog definition for this preset.
    #[must_use]
    pub fn definition(self) -> &'static Mode {
        match self {
            Self::Away => &CATALOG[0],
            Self::Sleep => &CATALOG[1],
            Self::Eco => &CATALOG[2],
        }
    }

    /// The devices this preset would switch off, given the current fleet.
    ///
    /// Essential devices are never targeted, and already-off devices are
    /// excluded so the batch only lists real state changes.
    #[must_use]
    pub fn targets(self, devices: &[DeviceSnapshot]) -> Vec<DeviceId> {
        devices
            .iter()
            .filter(|d| d.is_active && !d.essential)
            .filter(|d| match self {
                Self::Away => true,
                Self::Sleep => {
                    matches!(d.kind, DeviceKind::Lighting | DeviceKind::Entertainment)
                }
                Self::Eco => {
                    matches!(d.kind, DeviceKind::Entertainment | DeviceKind::Appliance)
                }
            })
            .map(|d| d.id)
            .collect()
    }
}

impl std::fmt::Display for ModeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Away => f.write_str("away"),
            Self::Sleep => f.write_str("sleep"),
            Self::Eco => f.write_str("eco"),
        }
    }
}

impl FromStr for ModeId {
    type Err = NotFoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "away" => Ok(Self::Away),
            "sleep" => Ok(Self::Sleep),
            "eco" => Ok(Self::Eco),
            other => Err(NotFoundError {
                entity: "Mode",
                id: other.to_string(),
            }),
        }
    }
}

/// A catalog entry describing one preset. Immutable at runtime.
#[derive(Debug, Serialize)]
pub struct Mode {
    pub id: ModeId,
    pub name: &'static str,
    pub description: &'static str,
    /// Rough savings label shown in the UI, not a computed figure.
    pub estimated_savings: &'static str,
    /// Human-readable summary of what activation does, in order.
    pub steps: &'static [&'static str],
}

/// The fixed mode catalog.
pub static CATALOG: [Mode; 3] = [
    Mode {
        id: ModeId::Away,
        name: "Away",
        description: "Nobody home: switch off everything that is not essential.",
        estimated_savings: "up to 40%",
        steps: &[
            "Turn off all lighting",
            "Turn off entertainment devices",
            "Turn off non-essential appliances and climate",
        ],
    },
    Mode {
        id: ModeId::Sleep,
        name: "Sleep",
        description: "Good night: lights and entertainment off, the rest untouched.",
        estimated_savings: "up to 15%",
        steps: &["Turn off all lighting", "Turn off entertainment devices"],
    },
    Mode {
        id: ModeId::Eco,
        name: "Eco",
        description: "Trim discretionary loads while the home stays occupied.",
        estimated_savings: "up to 20%",
        steps: &[
            "Turn off entertainment devices",
            "Turn off non-essential appliances",
        ],
    },
];
