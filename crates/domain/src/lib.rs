//! # homeflux-domain
//!
//! Pure domain model for the homeflux automation engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **AutomationRules** (trigger → action entries authored by the user)
//! - Define **Modes** (fixed one-tap presets: away, sleep, eco)
//! - Define the **device read-model** the engine queries (on/off state,
//!   power draw, per-device automation settings)
//! - Define **usage updates** and the live usage snapshot
//! - Define the **execution log** (immutable decision records with undo data)
//! - Define **candidates and decisions** flowing through the engine pipeline
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod decision;
pub mod device;
pub mod log;
pub mod mode;
pub mod rule;
pub mod usage;
