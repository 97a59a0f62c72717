//! Action — the device mutation a rule performs when it fires.

use serde::{Deserialize, Serialize};

use crate::id::DeviceId;
use crate::mode::ModeId;

/// What kind of mutation to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    TurnOn,
    TurnOff,
    /// Apply a mode preset. The preset computes its own device batch; the
    /// rule's device list is ignored for this kind.
    SetMode { mode: ModeId },
}

impl ActionKind {
    /// The on/off state this action drives devices into.
    ///
    /// Mode presets only ever switch devices off, so `set_mode` reports
    /// `false` as well.
    #[must_use]
    pub fn target_state(self) -> bool {
        match self {
            Self::TurnOn => true,
            Self::TurnOff | Self::SetMode { .. } => false,
        }
    }
}

/// The action half of a rule: a mutation kind plus its target devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleAction {
    #[serde(flatten)]
    pub kind: ActionKind,
    pub devices: Vec<DeviceId>,
}

impl std::fmt::Display for RuleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ActionKind::TurnOn => write!(f, "turn_on({} devices)", self.devices.len()),
            ActionKind::TurnOff => write!(f, "turn_off({} devices)", self.devices.len()),
            ActionKind::SetMode { mode } => write!(f, "set_mode({mode})"),
        }
    }
}
