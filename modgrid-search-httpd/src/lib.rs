//! Modgrid Search HTTP Gateway
//!
//! A standalone HTTP server that fronts the upstream mod catalog and
//! streams search results to callers as newline-delimited JSON frames
//! over one long-lived response.
//!
//! # Endpoints
//!
//! - `GET /api/search?q=<keyword>` - Stream search results
//! - `GET /health` - Health check

pub mod config;
pub mod routes;
pub mod state;

pub use config::Args;
pub use routes::build_router;
pub use state::AppState;
