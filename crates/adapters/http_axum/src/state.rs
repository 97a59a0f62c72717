//! Shared application state for axum handlers.

use std::sync::Arc;

use homeflux_app::engine::ModeActivator;
use homeflux_app::ports::{DeviceGateway, ExecutionLog, RuleRepository};
use homeflux_app::services::log_service::ExecutionLogService;
use homeflux_app::services::rule_service::RuleService;
use homeflux_domain::id::HomeId;

/// Application state shared across all axum handlers.
///
/// Generic over the rule repository, device gateway, and execution log to
/// avoid dynamic dispatch. `Clone` is implemented manually so the
/// underlying types themselves do not need to be `Clone` — only the `Arc`
/// wrappers are cloned.
pub struct AppState<R, G, L> {
    /// The home this daemon instance manages.
    pub home_id: HomeId,
    /// Rule CRUD service.
    pub rule_service: Arc<RuleService<R>>,
    /// Execution history and undo service.
    pub log_service: Arc<ExecutionLogService<L, G>>,
    /// One-tap mode preset activation.
    pub mode_activator: Arc<ModeActivator<G, L>>,
}

impl<R, G, L> Clone for AppState<R, G, L> {
    fn clone(&self) -> Self {
        Self {
            home_id: self.home_id,
            rule_service: Arc::clone(&self.rule_service),
            log_service: Arc::clone(&self.log_service),
            mode_activator: Arc::clone(&self.mode_activator),
        }
    }
}

impl<R, G, L> AppState<R, G, L>
where
    R: RuleRepository + Send + Sync + 'static,
    G: DeviceGateway + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(
        home_id: HomeId,
        rule_service: RuleService<R>,
        log_service: ExecutionLogService<L, G>,
        mode_activator: ModeActivator<G, L>,
    ) -> Self {
        Self {
            home_id,
            rule_service: Arc::new(rule_service),
            log_service: Arc::new(log_service),
            mode_activator: Arc::new(mode_activator),
        }
    }

    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// Use this when services need to be shared with background tasks
    /// before constructing the HTTP state.
    pub fn from_arcs(
        home_id: HomeId,
        rule_service: Arc<RuleService<R>>,
        log_service: Arc<ExecutionLogService<L, G>>,
        mode_activator: Arc<ModeActivator<G, L>>,
    ) -> Self {
        Self {
            home_id,
            rule_service,
            log_service,
            mode_activator,
        }
    }
}
