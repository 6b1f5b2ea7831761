//! Gateway configuration via CLI arguments and environment variables.

use clap::Parser;
use modgrid_search_service::{FetchPolicy, StreamConfig};
use std::net::SocketAddr;
use std::time::Duration;

/// Modgrid Search HTTP Gateway
#[derive(Parser, Debug, Clone)]
#[command(name = "modgrid-search-httpd")]
#[command(about = "HTTP gateway streaming mod catalog search results")]
pub struct Args {
    /// Listen address
    #[arg(long, default_value = "0.0.0.0:8080", env = "MODGRID_SEARCH_LISTEN")]
    pub listen: SocketAddr,

    /// Upstream catalog base URL
    #[arg(
        long,
        default_value = "https://api.dicecho.com",
        env = "MODGRID_UPSTREAM_URL"
    )]
    pub upstream_url: reqwest::Url,

    /// Maximum records streamed per search (first page only)
    #[arg(long, default_value = "10", env = "MODGRID_SEARCH_PAGE_CAP")]
    pub page_cap: usize,

    /// Records processed concurrently per fan-out batch
    #[arg(long, default_value = "2", env = "MODGRID_SEARCH_BATCH_SIZE")]
    pub batch_size: usize,

    /// Pause between fan-out batches in milliseconds
    #[arg(long, default_value = "200", env = "MODGRID_SEARCH_BATCH_PACING_MS")]
    pub batch_pacing_ms: u64,

    /// Retries for the upstream search call
    #[arg(long, default_value = "5", env = "MODGRID_SEARCH_MAX_RETRIES")]
    pub search_max_retries: u32,

    /// Per-attempt deadline for the upstream search call in milliseconds
    #[arg(long, default_value = "5000", env = "MODGRID_SEARCH_TIMEOUT_MS")]
    pub search_timeout_ms: u64,

    /// Wait between upstream retries in milliseconds
    #[arg(long, default_value = "500", env = "MODGRID_SEARCH_RETRY_DELAY_MS")]
    pub search_retry_delay_ms: u64,
}

impl Args {
    /// The upstream retry budget configured by these arguments.
    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            max_retries: self.search_max_retries,
            timeout: Duration::from_millis(self.search_timeout_ms),
            retry_delay: Duration::from_millis(self.search_retry_delay_ms),
        }
    }

    /// The per-request stream tuning configured by these arguments.
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            page_cap: self.page_cap,
            batch_size: self.batch_size,
            batch_pacing: Duration::from_millis(self.batch_pacing_ms),
        }
    }
}
