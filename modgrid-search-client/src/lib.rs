//! Stream consumer for the modgrid search gateway.
//!
//! Issues one gateway request per user search action, incrementally
//! decodes the NDJSON frame stream as chunks arrive, merges records into
//! a keyed live result set, and maps frames to UI status transitions.
//!
//! # Supersession
//!
//! At most one [`SearchSession`] is authoritative at a time. Starting a
//! new search revokes the previous session: its connection is cancelled
//! and any frames still in flight are discarded at the authority check,
//! so they can never mutate the visible result set or status. Cancelling
//! a superseded session is expected, silent behavior, never an error.

mod client;
mod error;
mod results;
mod session;
mod status;

pub use client::{SearchClient, SearchUpdate};
pub use error::ClientError;
pub use results::LiveResultSet;
pub use session::SearchSession;
pub use status::SearchStatus;
