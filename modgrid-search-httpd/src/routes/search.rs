//! Streaming search endpoint: `GET /api/search?q=<keyword>`.
//!
//! Emits newline-delimited JSON frames over a long-lived response with
//! natural backpressure via an `mpsc` channel. When the caller
//! disconnects, the body stream (and with it the channel receiver) is
//! dropped; the producer's next send fails and trips the request's
//! cancellation token, so no further upstream work starts.

use crate::state::AppState;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use modgrid_search_protocol::Frame;
use modgrid_search_service::{run_search, FrameSink};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Query parameters for the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// The search keyword.
    #[serde(default)]
    pub q: Option<String>,
}

/// Handle GET /api/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let keyword = params.q.as_deref().map(str::trim).unwrap_or("");

    // Reject before any upstream work or streaming begins.
    if keyword.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(serde_json::json!({
                "error": "search keyword must not be empty"
            })),
        )
            .into_response();
    }
    let keyword = keyword.to_string();

    debug!(keyword = %keyword, "search: starting stream");

    // Channel for backpressure-aware streaming.
    let (tx, rx) = mpsc::channel::<Frame>(64);
    let cancel = CancellationToken::new();
    let sink = FrameSink::new(tx, cancel.clone());

    // Spawn producer task; it outlives the handler but not the response.
    let catalog = state.catalog.clone();
    let config = state.stream_config.clone();
    tokio::spawn(async move {
        run_search(&catalog, &keyword, &config, &cancel, &sink).await;
    });

    // Convert receiver into a body stream of NDJSON lines.
    let stream = futures::stream::unfold(rx, |mut rx| async move {
        let frame = rx.recv().await?;
        let line = Bytes::from(frame.to_ndjson_line());
        Some((Ok::<_, Infallible>(line), rx))
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(stream))
        .expect("response builder cannot fail")
}
