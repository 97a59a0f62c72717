//! JSON handlers for mode presets.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use homeflux_app::ports::{DeviceGateway, ExecutionLog, RuleRepository};
use homeflux_domain::log::ExecutionLogEntry;
use homeflux_domain::mode::{CATALOG, Mode, ModeId};

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<&'static [Mode; 3]>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the activate endpoint.
pub enum ActivateResponse {
    /// The resulting combined log entry, executed or skipped.
    Ok(Json<ExecutionLogEntry>),
}

impl IntoResponse for ActivateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/modes` — the fixed mode catalog.
pub async fn list() -> ListResponse {
    ListResponse::Ok(Json(&CATALOG))
}

/// `POST /api/modes/{id}/activate` — run a mode batch for the managed home.
pub async fn activate<R, G, L>(
    State(state): State<AppState<R, G, L>>,
    Path(id): Path<String>,
) -> Result<ActivateResponse, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    G: DeviceGateway + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
{
    let mode: ModeId = id
        .parse()
        .map_err(homeflux_domain::error::HomeFluxError::NotFound)?;
    let entry = state.mode_activator.activate(state.home_id, mode).await?;
    Ok(ActivateResponse::Ok(Json(entry)))
}
