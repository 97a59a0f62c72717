//! # homeflux-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `RuleRepository` — CRUD for automation rules
//!   - `DeviceGateway` — read device snapshots, write on/off state
//!   - `ExecutionLog` — append-only decision history
//!   - `UsagePublisher` — push live usage readings into the engine
//! - Run the **automation engine**: trigger evaluation, conflict resolution,
//!   idempotent execution, daily-limit and schedule enforcement
//! - Provide **in-process infrastructure** (usage bus) that doesn't need IO
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `homeflux-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod engine;
pub mod ports;
pub mod services;
pub mod usage_bus;
