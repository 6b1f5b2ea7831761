//! Service-level error taxonomy.
//!
//! Classification drives behavior everywhere an error is caught:
//! cancellation is never retried and never surfaced to the end user,
//! per-record failures are contained at the record boundary, and
//! everything else terminates the stream with a fatal `error` frame.

use modgrid_search_protocol::RecordError;
use thiserror::Error;

/// Errors produced while running one search.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller no longer wants this work. Never retried.
    #[error("request cancelled")]
    Cancelled,

    /// Retries exhausted against the upstream catalog.
    #[error("upstream unavailable after {attempts} attempts: {message}")]
    UpstreamUnavailable { attempts: u32, message: String },

    /// Non-2xx status or malformed envelope from the upstream.
    #[error("bad upstream response: {message}")]
    BadUpstreamResponse { message: String },

    /// Empty search keyword; rejected before any upstream call.
    #[error("search keyword must not be empty")]
    InvalidKeyword,

    /// One record failed to normalize; isolated to that record.
    #[error(transparent)]
    Record(#[from] RecordError),
}

impl ServiceError {
    /// Check whether this failure means "caller no longer wants this".
    ///
    /// Decisions about retrying or surfacing an error must use this
    /// classification, never the message text.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ServiceError::Cancelled)
    }
}

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
