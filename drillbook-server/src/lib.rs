//! drillbook-server: HTTP API for a defense drill catalog
//!
//! Drills, categories, sub-categories and per-drill instructions stored in
//! PostgreSQL and exposed as JSON over HTTP.
//!
//! Layers, leaves first:
//! - [`models`]: validated domain types
//! - [`db`]: pool, schema bootstrap and repositories
//! - [`translate`]: persistence/validation failures to user-facing text
//! - [`service`]: save orchestration and error normalization
//! - [`http`]: axum router, extractors and error responses

pub mod db;
pub mod http;
pub mod models;
pub mod service;
pub mod translate;

pub use http::{build_router, run_server, ApiError, AppState, ServerConfig, ServerError};
