//! UI-facing search status.

/// Status of the current search, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    /// No search has been started.
    Idle,
    /// A search is in flight.
    Searching {
        /// Progress message ("Searching...", "found N results, ...").
        message: String,
    },
    /// The search finished with at least one result.
    Success,
    /// The search finished without results; visually distinct from failure.
    NoResults {
        /// Explanation from the gateway, or a default.
        message: String,
    },
    /// The search failed; the UI offers a retry that replays the last keyword.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

impl SearchStatus {
    /// True once the search can no longer change status on its own.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SearchStatus::Success | SearchStatus::NoResults { .. } | SearchStatus::Error { .. }
        )
    }
}
