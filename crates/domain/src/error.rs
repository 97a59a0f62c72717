//! Common error types used across the workspace.
//!
//! One base [`HomeFluxError`] enum with typed sub-errors and `#[from]`
//! conversion. Each layer converts its own failures into one of these four
//! kinds; there are no stringly-typed variants.

use crate::id::DeviceId;

/// Base error type for every fallible operation in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum HomeFluxError {
    /// A rule, trigger, or action failed validation before reaching storage.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A rule, mode, or log entry id did not resolve to anything.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The operation is not valid for the target's current state.
    #[error("invalid state")]
    InvalidState(#[from] InvalidStateError),

    /// Talking to a physical device failed.
    #[error("device unavailable")]
    DeviceUnavailable(#[from] DeviceUnavailableError),
}

/// Malformed rule, trigger, or action. Surfaced synchronously to the
/// caller creating or editing a rule; never stored.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("a trigger is required")]
    MissingTrigger,
    #[error("action must target at least one device")]
    NoTargetDevices,
    #[error("time trigger must include at least one day of the week")]
    NoScheduleDays,
    #[error("time trigger out of range: hour {hour}, minute {minute}")]
    TimeOutOfRange { hour: u32, minute: u32 },
    #[error("usage threshold must be a positive number of watts")]
    NonPositiveThreshold,
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

/// An id lookup that came up empty.
#[derive(Debug, thiserror::Error)]
#[error("{entity} with id {id} not found")]
pub struct NotFoundError {
    /// The kind of thing looked up (`"Rule"`, `"Mode"`, `"LogEntry"`, …).
    pub entity: &'static str,
    pub id: String,
}

/// The operation conflicts with the target's current state.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidStateError {
    /// Undo requested for an entry that was never executed.
    #[error("log entry was not executed; nothing to undo")]
    NotUndoable,
    /// Undo requested for an entry that has already been undone.
    #[error("log entry has already been undone")]
    AlreadyUndone,
    /// A mode batch for this home is still in flight.
    #[error("a mode activation is already pending for this home")]
    ModeActivationPending,
}

/// Transient failure talking to a device during execution.
#[derive(Debug, thiserror::Error)]
#[error("device {device_id} unavailable: {reason}")]
pub struct DeviceUnavailableError {
    pub device_id: DeviceId,
    pub reason: String,
}
