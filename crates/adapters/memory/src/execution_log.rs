//! In-memory execution log.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use homeflux_app::ports::ExecutionLog;
use homeflux_domain::error::{HomeFluxError, NotFoundError};
use homeflux_domain::id::{HomeId, LogEntryId};
use homeflux_domain::log::{ExecutionLogEntry, UserResponse};
use homeflux_domain::time::Timestamp;

#[derive(Default)]
struct Inner {
    // Append order doubles as chronological order.
    entries: Vec<ExecutionLogEntry>,
    index: HashMap<LogEntryId, usize>,
}

/// Execution log backed by a shared in-process append-only vector.
#[derive(Clone, Default)]
pub struct InMemoryExecutionLog {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryExecutionLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ExecutionLog for InMemoryExecutionLog {
    fn append(
        &self,
        entry: ExecutionLogEntry,
    ) -> impl Future<Output = Result<ExecutionLogEntry, HomeFluxError>> + Send {
        let mut inner = self.lock();
        let next_index = inner.entries.len();
        inner.index.insert(entry.id, next_index);
        inner.entries.push(entry.clone());
        drop(inner);
        async { Ok(entry) }
    }

    fn get_by_id(
        &self,
        id: LogEntryId,
    ) -> impl Future<Output = Result<Option<ExecutionLogEntry>, HomeFluxError>> + Send {
        let inner = self.lock();
        let found = inner
            .index
            .get(&id)
            .and_then(|i| inner.entries.get(*i))
            .cloned();
        drop(inner);
        async { Ok(found) }
    }

    fn recent(
        &self,
        home_id: HomeId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ExecutionLogEntry>, HomeFluxError>> + Send {
        let entries: Vec<_> = self
            .lock()
            .entries
            .iter()
            .rev()
            .filter(|e| e.home_id == home_id)
            .take(limit)
            .cloned()
            .collect();
        async { Ok(entries) }
    }

    fn mark_undone(
        &self,
        id: LogEntryId,
        at: Timestamp,
    ) -> impl Future<Output = Result<ExecutionLogEntry, HomeFluxError>> + Send {
        let mut inner = self.lock();
        let result = match inner.index.get(&id).copied() {
            Some(i) => {
                let entry = &mut inner.entries[i];
                entry.user_response = Some(UserResponse::Undone { at });
                Ok(entry.clone())
            }
            None => Err(NotFoundError {
                entity: "LogEntry",
                id: id.to_string(),
            }
            .into()),
        };
        drop(inner);
        async { result }
    }
}
