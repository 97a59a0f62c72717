//! # homeflux-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the JSON API for rules, mode presets, and the execution log
//!   (`/api/rules`, `/api/modes`, `/api/logs`, …)
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map application errors onto HTTP status codes
//!
//! ## Dependency rule
//! Depends on `homeflux-app` (for port traits and services) and
//! `homeflux-domain` (for types used in request/response mapping). Never
//! leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
