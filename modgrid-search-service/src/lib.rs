//! Gateway-side search orchestration.
//!
//! This crate implements one streaming search: it queries the upstream
//! catalog with a resilient retry policy, normalizes and batches the
//! matched records, and emits them as a sequence of protocol frames over
//! a sink that the HTTP layer turns into a streamed response body.
//!
//! # Architecture
//!
//! - [`fetch`]: one HTTP request with a bounded timeout and fixed-delay
//!   retries, cancellation-aware
//! - [`batch`]: bounded-concurrency fan-out over an ordered work list
//! - [`CatalogClient`]: the upstream search call plus envelope validation
//! - [`run_search`]: the per-request state machine
//!   (Init → Searching → Success | Empty | Failed → Closed)
//!
//! Each request is independent; the crate holds no cross-request state.

pub mod batch;
pub mod catalog;
pub mod error;
pub mod fetch;
pub mod stream;

pub use batch::run_batches;
pub use catalog::CatalogClient;
pub use error::{Result, ServiceError};
pub use fetch::{fetch_with_retry, FetchPolicy};
pub use stream::{run_search, FrameSink, StreamConfig};
