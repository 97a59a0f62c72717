//! Automation engine — evaluates triggers and drives device state.
//!
//! The engine works in passes. A pass collects per-device candidate actions
//! from the trigger evaluator and the enforcement monitors, resolves
//! conflicts so at most one action executes per device, then applies the
//! surviving decisions through the device gateway. Every decision, executed
//! or skipped, becomes exactly one execution-log entry.

pub mod evaluator;
pub mod executor;
pub mod limit_monitor;
pub mod locks;
pub mod mode_activator;
pub mod resolver;
pub mod worker;

pub use evaluator::{Pass, TriggerEvaluator};
pub use executor::ActionExecutor;
pub use limit_monitor::LimitMonitor;
pub use locks::DeviceLocks;
pub use mode_activator::ModeActivator;
pub use resolver::ConflictResolver;
pub use worker::EngineWorker;
