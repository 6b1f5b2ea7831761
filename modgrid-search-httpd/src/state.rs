//! Application state shared across handlers.

use crate::config::Args;
use modgrid_search_service::{CatalogClient, StreamConfig};

/// Application state shared across handlers.
///
/// The gateway holds no cross-request mutable state; each search request
/// is independent.
pub struct AppState {
    /// Upstream catalog client.
    pub catalog: CatalogClient,
    /// Per-request stream tuning.
    pub stream_config: StreamConfig,
}

impl AppState {
    /// Build state from parsed arguments.
    pub fn from_args(args: &Args) -> Self {
        Self {
            catalog: CatalogClient::with_policy(args.upstream_url.clone(), args.fetch_policy()),
            stream_config: args.stream_config(),
        }
    }

    /// Build state from explicit parts (used by tests).
    pub fn new(catalog: CatalogClient, stream_config: StreamConfig) -> Self {
        Self {
            catalog,
            stream_config,
        }
    }
}
