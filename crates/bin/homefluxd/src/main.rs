//! # homefluxd — homeflux automation daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Construct the in-memory stores and the virtual device gateway
//! - Construct application services, injecting adapters via port traits
//! - Spawn the engine worker and (optionally) the usage simulation feed
//! - Build the axum router, bind to a TCP port, and serve
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use homeflux_adapter_http_axum::state::AppState;
use homeflux_adapter_memory::{InMemoryExecutionLog, InMemoryRuleRepository};
use homeflux_adapter_virtual::VirtualHomeGateway;
use homeflux_app::engine::{DeviceLocks, EngineWorker, ModeActivator};
use homeflux_app::ports::UsagePublisher;
use homeflux_app::services::log_service::ExecutionLogService;
use homeflux_app::services::rule_service::RuleService;
use homeflux_app::usage_bus::UsageBus;
use homeflux_domain::id::HomeId;
use homeflux_domain::time;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let home_id = HomeId::new();
    let action_timeout = Duration::from_millis(config.engine.action_timeout_ms);

    // Adapters
    let gateway = VirtualHomeGateway::demo_home(home_id, config.simulation.tariff_rate);
    let rule_repo = InMemoryRuleRepository::new();
    let execution_log = InMemoryExecutionLog::new();

    // Shared engine state
    let locks = Arc::new(DeviceLocks::new());
    let usage_bus = Arc::new(UsageBus::new(256));

    // Engine worker
    let worker = EngineWorker::new(
        home_id,
        rule_repo.clone(),
        gateway.clone(),
        execution_log.clone(),
        Arc::clone(&locks),
        usage_bus.subscribe(),
        Duration::from_secs(config.engine.tick_seconds),
        action_timeout,
    );
    tokio::spawn(worker.run());

    // Simulated usage feed
    if config.simulation.enabled {
        let interval = Duration::from_secs(config.simulation.interval_seconds);
        tokio::spawn(simulation_feed(
            gateway.clone(),
            Arc::clone(&usage_bus),
            interval,
        ));
    }

    // Services
    let rule_service = RuleService::new(rule_repo);
    let log_service =
        ExecutionLogService::new(execution_log.clone(), gateway.clone(), Arc::clone(&locks));
    let mode_activator = ModeActivator::new(gateway, execution_log, locks, action_timeout);

    // HTTP
    let state = AppState::new(home_id, rule_service, log_service, mode_activator);
    let app = homeflux_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, %home_id, "homefluxd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Periodically advance the virtual fleet and publish one reading per
/// device, resetting accumulated energy at local midnight like a meter.
async fn simulation_feed(
    gateway: VirtualHomeGateway,
    bus: Arc<UsageBus>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    let mut last_date = time::local_now().date();
    loop {
        ticker.tick().await;

        let today = time::local_now().date();
        if today != last_date {
            gateway.reset_daily_accumulation();
            last_date = today;
        }

        for update in gateway.advance(interval) {
            if let Err(error) = bus.publish(update).await {
                tracing::warn!(%error, "failed to publish simulated reading");
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
