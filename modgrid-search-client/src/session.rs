//! Search session tokens.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Token representing "the currently authoritative search".
///
/// An explicit value object passed by reference into the read loop, rather
/// than a shared mutable "current controller" slot: revocation and the
/// authority check cannot race, because a revoked session stays revoked
/// and outdated frame handling is rendered inert rather than locked out.
#[derive(Debug, Clone)]
pub struct SearchSession {
    authoritative: Arc<AtomicBool>,
    cancel: CancellationToken,
}

impl SearchSession {
    /// Create a new, authoritative session.
    pub fn new() -> Self {
        Self {
            authoritative: Arc::new(AtomicBool::new(true)),
            cancel: CancellationToken::new(),
        }
    }

    /// True while this session's frames may affect visible state.
    pub fn is_authoritative(&self) -> bool {
        self.authoritative.load(Ordering::Acquire)
    }

    /// Mark the session non-authoritative and cancel its connection.
    ///
    /// Idempotent. Called when a newer search supersedes this one or the
    /// owning component is torn down.
    pub fn revoke(&self) {
        self.authoritative.store(false, Ordering::Release);
        self.cancel.cancel();
    }

    /// Resolves when the session is revoked.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_authoritative() {
        let session = SearchSession::new();
        assert!(session.is_authoritative());
    }

    #[test]
    fn test_revoke_is_visible_through_clones() {
        let session = SearchSession::new();
        let loop_handle = session.clone();

        session.revoke();

        assert!(!loop_handle.is_authoritative());
    }

    #[tokio::test]
    async fn test_revoke_resolves_cancelled() {
        let session = SearchSession::new();
        session.revoke();
        // Completes immediately once revoked.
        session.cancelled().await;
    }
}
