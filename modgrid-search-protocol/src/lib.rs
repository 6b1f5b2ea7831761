//! Wire contract for the modgrid streaming search pipeline.
//!
//! This crate defines the types shared between the search gateway and its
//! consumers:
//!
//! - [`Frame`]: the newline-delimited JSON messages streamed by the gateway
//! - [`ResultRecord`] / [`RecordId`]: the normalized result unit
//! - Upstream catalog envelope types ([`CatalogEnvelope`] and friends),
//!   treated as untrusted input and validated during normalization
//!
//! # Stream shape
//!
//! One gateway request produces an ordered frame sequence: an `init` frame
//! first, then zero or more per-record frames (`gameStart` / `gameError`),
//! then a single terminal frame (`end` on completion, `error` on fatal
//! failure). `gameComplete` is part of the contract for consumers but is
//! reserved for a later enrichment phase and is not currently emitted.

mod frame;
mod record;
mod upstream;

pub use frame::Frame;
pub use record::{RecordError, RecordId, ResultRecord};
pub use upstream::{CatalogEnvelope, CatalogPage, CatalogRecord};

/// Maximum number of records streamed per search (first page only).
pub const PAGE_CAP: usize = 10;

/// Number of records processed concurrently per fan-out batch.
pub const BATCH_SIZE: usize = 2;

/// Pause between fan-out batches, in milliseconds.
pub const BATCH_PACING_MS: u64 = 200;
