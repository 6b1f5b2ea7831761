//! Error types for the stream consumer.

use thiserror::Error;

/// Errors raised while running one search session.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Gateway answered with a non-success status.
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// The session was cancelled or superseded.
    #[error("search cancelled")]
    Cancelled,
}

impl ClientError {
    /// Check whether this failure is a cancellation.
    ///
    /// Cancellation is expected behavior (a newer search superseded this
    /// one, or the surrounding component was torn down) and must never be
    /// surfaced as an error. The decision is made on this classification,
    /// never on message text.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}
