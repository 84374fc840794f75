//! Axum HTTP API server.
//!
//! This crate provides:
//! - `POST /generate`, which runs the pipeline and records the video
//! - The JSON catalog and video streaming routes
//! - Security headers, request ids and Prometheus metrics

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use catalog::{CatalogError, CatalogStore};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
