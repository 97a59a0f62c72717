//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod logs;
#[allow(clippy::missing_errors_doc)]
pub mod modes;
#[allow(clippy::missing_errors_doc)]
pub mod rules;

use axum::Router;
use axum::routing::{get, post};

use homeflux_app::ports::{DeviceGateway, ExecutionLog, RuleRepository};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<R, G, L>() -> Router<AppState<R, G, L>>
where
    R: RuleRepository + Send + Sync + 'static,
    G: DeviceGateway + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
{
    Router::new()
        // Rules
        .route(
            "/rules",
            get(rules::list::<R, G, L>).post(rules::create::<R, G, L>),
        )
        .route(
            "/rules/{id}",
            get(rules::get::<R, G, L>).delete(rules::delete::<R, G, L>),
        )
        // Modes
        .route("/modes", get(modes::list))
        .route("/modes/{id}/activate", post(modes::activate::<R, G, L>))
        // Execution log
        .route("/logs", get(logs::list::<R, G, L>))
        .route("/logs/{id}/undo", post(logs::undo::<R, G, L>))
}
