//! Upstream catalog client.
//!
//! Issues the primary search call against the catalog's `/api/mod`
//! endpoint using the aggressive retry budget, then validates the
//! response envelope before anything is streamed.

use crate::error::{Result, ServiceError};
use crate::fetch::{fetch_with_retry, FetchPolicy};
use modgrid_search_protocol::{CatalogEnvelope, CatalogPage};
use reqwest::Url;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The catalog rejects requests without a browser-like user agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// HTTP client for the upstream catalog search endpoint.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: Url,
    policy: FetchPolicy,
}

impl CatalogClient {
    /// Create a client with the aggressive search retry budget.
    pub fn new(base_url: Url) -> Self {
        Self::with_policy(base_url, FetchPolicy::catalog_search())
    }

    /// Create a client with an explicit retry budget.
    pub fn with_policy(base_url: Url, policy: FetchPolicy) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url,
            policy,
        }
    }

    /// Search the catalog for `keyword`, returning the validated page.
    ///
    /// The keyword is percent-encoded into the query string. A non-2xx
    /// status or a malformed envelope is a hard failure for the request:
    /// no partial results are possible at this stage.
    pub async fn search(&self, keyword: &str, cancel: &CancellationToken) -> Result<CatalogPage> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(ServiceError::InvalidKeyword);
        }

        let mut url = self.base_url.clone();
        url.set_path("/api/mod");
        url.query_pairs_mut().append_pair("keyword", keyword);

        tracing::info!(keyword, url = %url, "searching catalog");

        let request = self
            .http
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .header("Accept-Language", "en-US,en;q=0.9");

        let response = fetch_with_retry(request, self.policy, cancel).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::BadUpstreamResponse {
                message: format!("catalog returned HTTP {}", status),
            });
        }

        let envelope: CatalogEnvelope =
            response
                .json()
                .await
                .map_err(|e| ServiceError::BadUpstreamResponse {
                    message: format!("malformed catalog envelope: {}", e),
                })?;

        // A missing data section means the upstream answered with something
        // other than a search result (maintenance page, rate-limit body).
        let page = envelope.data.ok_or_else(|| ServiceError::BadUpstreamResponse {
            message: "catalog envelope has no data section".to_string(),
        })?;

        tracing::debug!(
            total = page.total_count,
            returned = page.data.len(),
            "catalog search complete"
        );

        Ok(page)
    }
}
