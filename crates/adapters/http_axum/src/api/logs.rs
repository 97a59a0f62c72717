//! JSON handlers for the execution log.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use homeflux_app::ports::{DeviceGateway, ExecutionLog, RuleRepository};
use homeflux_domain::error::{HomeFluxError, ValidationError};
use homeflux_domain::id::LogEntryId;
use homeflux_domain::log::ExecutionLogEntry;

use crate::error::ApiError;
use crate::state::AppState;

/// Entries returned by `GET /api/logs` when no limit is given.
const DEFAULT_LIMIT: usize = 20;

/// Query parameters for the list endpoint.
#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<ExecutionLogEntry>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the undo endpoint.
pub enum UndoResponse {
    /// The entry with its terminal undone marker attached.
    Ok(Json<ExecutionLogEntry>),
}

impl IntoResponse for UndoResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/logs?limit=N` — recent decisions, newest first.
pub async fn list<R, G, L>(
    State(state): State<AppState<R, G, L>>,
    Query(query): Query<ListQuery>,
) -> Result<ListResponse, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    G: DeviceGateway + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let entries = state.log_service.recent(state.home_id, limit).await?;
    Ok(ListResponse::Ok(Json(entries)))
}

/// `POST /api/logs/{id}/undo` — revert an executed entry.
pub async fn undo<R, G, L>(
    State(state): State<AppState<R, G, L>>,
    Path(id): Path<String>,
) -> Result<UndoResponse, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    G: DeviceGateway + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
{
    let entry_id: LogEntryId = id.parse().map_err(|_| {
        ApiError::from(HomeFluxError::Validation(ValidationError::InvalidId(
            id.clone(),
        )))
    })?;
    let entry = state.log_service.undo(entry_id).await?;
    Ok(UndoResponse::Ok(Json(entry)))
}
