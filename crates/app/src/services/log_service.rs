//! Execution log service — listing history and undoing decisions.

use std::sync::Arc;

use homeflux_domain::error::{HomeFluxError, InvalidStateError, NotFoundError};
use homeflux_domain::id::{HomeId, LogEntryId};
use homeflux_domain::log::ExecutionLogEntry;
use homeflux_domain::time;

use crate::engine::locks::DeviceLocks;
use crate::ports::{DeviceGateway, ExecutionLog};

/// Application service for the execution log.
pub struct ExecutionLogService<L, G> {
    log: L,
    gateway: G,
    locks: Arc<DeviceLocks>,
}

impl<L, G> ExecutionLogService<L, G>
where
    L: ExecutionLog,
    G: DeviceGateway,
{
    pub fn new(log: L, gateway: G, locks: Arc<DeviceLocks>) -> Self {
        Self { log, gateway, locks }
    }

    /// The most recent log entries for a home, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the log.
    pub async fn recent(
        &self,
        home_id: HomeId,
        limit: usize,
    ) -> Result<Vec<ExecutionLogEntry>, HomeFluxError> {
        self.log.recent(home_id, limit).await
    }

    /// Undo an executed entry by applying the inverse action.
    ///
    /// Every device the entry changed is driven back to its previous state;
    /// only then is the terminal undone marker attached. Rule stats are
    /// never touched by an undo. The reversal is itself a state change but
    /// not a decision, so no new log entry is appended.
    ///
    /// # Errors
    ///
    /// - [`HomeFluxError::NotFound`] when `id` does not resolve
    /// - [`HomeFluxError::InvalidState`] when the entry was never executed
    ///   or is already undone
    /// - [`HomeFluxError::DeviceUnavailable`] when reverting a device
    ///   fails; the entry is left un-undone so the user can retry
    #[tracing::instrument(skip(self))]
    pub async fn undo(&self, id: LogEntryId) -> Result<ExecutionLogEntry, HomeFluxError> {
        let entry = self.log.get_by_id(id).await?.ok_or_else(|| NotFoundError {
            entity: "LogEntry",
            id: id.to_string(),
        })?;

        if !entry.executed {
            return Err(InvalidStateError::NotUndoable.into());
        }
        if entry.user_response.is_some() {
            return Err(InvalidStateError::AlreadyUndone.into());
        }

        let target_state = entry.undo_target_state();
        for device_id in &entry.action.devices {
            let lock = self.locks.for_device(*device_id);
            let _guard = lock.lock().await;
            self.gateway.set_device_state(*device_id, target_state).await?;
        }

        self.log.mark_undone(id, time::now()).await
    }
}
