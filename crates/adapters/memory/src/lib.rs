//! # homeflux-adapter-memory
//!
//! In-memory implementations of the storage ports. Rules and the execution
//! log live in process memory and vanish on restart; durable storage is an
//! explicit non-feature of the engine, which treats both as caches owned by
//! whoever embeds it.
//!
//! Both adapters are cheaply cloneable handles over shared state, so the
//! HTTP layer and the engine worker can hold the same store.
//!
//! ## Dependency rule
//!
//! Depends on `homeflux-app` (port traits) and `homeflux-domain` only.

mod execution_log;
mod rule_repo;

pub use execution_log::InMemoryExecutionLog;
pub use rule_repo::InMemoryRuleRepository;
