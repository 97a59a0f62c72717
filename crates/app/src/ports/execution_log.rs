//! Execution log port — append-only decision history.

use std::future::Future;

use homeflux_domain::error::HomeFluxError;
use homeflux_domain::id::{HomeId, LogEntryId};
use homeflux_domain::log::ExecutionLogEntry;
use homeflux_domain::time::Timestamp;

/// Append and query [`ExecutionLogEntry`]s.
///
/// Entries are immutable once appended; `mark_undone` is the single
/// permitted annotation and it is terminal.
pub trait ExecutionLog {
    /// Append a new entry.
    fn append(
        &self,
        entry: ExecutionLogEntry,
    ) -> impl Future<Output = Result<ExecutionLogEntry, HomeFluxError>> + Send;

    /// Get an entry by its unique identifier.
    fn get_by_id(
        &self,
        id: LogEntryId,
    ) -> impl Future<Output = Result<Option<ExecutionLogEntry>, HomeFluxError>> + Send;

    /// The most recent entries for a home, newest first.
    fn recent(
        &self,
        home_id: HomeId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ExecutionLogEntry>, HomeFluxError>> + Send;

    /// Attach the terminal undone annotation to an entry.
    ///
    /// Returns the updated entry, or [`HomeFluxError::NotFound`] when the
    /// id does not resolve.
    fn mark_undone(
        &self,
        id: LogEntryId,
        at: Timestamp,
    ) -> impl Future<Output = Result<ExecutionLogEntry, HomeFluxError>> + Send;
}
