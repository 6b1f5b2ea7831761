//! Per-request search stream
//!
//! Drives one search through Init → Searching → (Success | Empty | Failed)
//! → Closed, emitting protocol frames into a [`FrameSink`]. The HTTP layer
//! turns the sink's channel into a streamed response body; when the caller
//! disconnects, the channel closes, the sink trips the cancellation token,
//! and no further upstream work starts.

use crate::batch::run_batches;
use crate::catalog::CatalogClient;
use crate::error::{Result, ServiceError};
use modgrid_search_protocol::{
    CatalogRecord, Frame, RecordId, BATCH_PACING_MS, BATCH_SIZE, PAGE_CAP,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Tuning for one search stream.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Maximum records streamed (first page only).
    pub page_cap: usize,
    /// Records processed concurrently per batch.
    pub batch_size: usize,
    /// Pause between batches.
    pub batch_pacing: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            page_cap: PAGE_CAP,
            batch_size: BATCH_SIZE,
            batch_pacing: Duration::from_millis(BATCH_PACING_MS),
        }
    }
}

/// Frame outlet for one request.
///
/// Wraps the producer side of the response channel. A failed send means
/// the consumer went away, so the sink trips the request's cancellation
/// token: terminal-frame emission is best-effort under disconnection.
#[derive(Debug, Clone)]
pub struct FrameSink {
    tx: mpsc::Sender<Frame>,
    cancel: CancellationToken,
}

impl FrameSink {
    /// Create a sink feeding `tx`, tied to the request's token.
    pub fn new(tx: mpsc::Sender<Frame>, cancel: CancellationToken) -> Self {
        Self { tx, cancel }
    }

    /// Send one frame. Returns false (and cancels the request) if the
    /// receiving side is gone.
    pub async fn send(&self, frame: Frame) -> bool {
        if self.tx.send(frame).await.is_err() {
            self.cancel.cancel();
            false
        } else {
            true
        }
    }
}

/// Run one search to completion, emitting frames into `sink`.
///
/// The stream always terminates with an `end` or `error` frame, except
/// when the far end has disconnected, in which case emission stops at the
/// next cooperative check point without a terminal frame.
pub async fn run_search(
    catalog: &CatalogClient,
    keyword: &str,
    config: &StreamConfig,
    cancel: &CancellationToken,
    sink: &FrameSink,
) {
    // Init: announce the search before any upstream work.
    if !sink
        .send(Frame::Init {
            message: Some("Searching...".to_string()),
            total: None,
        })
        .await
    {
        return;
    }

    // Searching: the upstream call with the aggressive retry budget.
    let page = match catalog.search(keyword, cancel).await {
        Ok(page) => page,
        Err(e) if e.is_cancelled() => {
            tracing::debug!(keyword, "search cancelled by caller");
            return;
        }
        Err(e) => {
            tracing::error!(keyword, error = %e, "catalog search failed");
            sink.send(Frame::Error {
                message: e.to_string(),
            })
            .await;
            return;
        }
    };

    // Empty: no batching work, terminate immediately.
    if page.total_count == 0 || page.data.is_empty() {
        tracing::info!(keyword, "no catalog matches");
        sink.send(Frame::End {
            message: Some("no matching modules found".to_string()),
            success_count: None,
        })
        .await;
        return;
    }

    // Only the first page is streamed; the upstream may return more.
    let records: Vec<CatalogRecord> = page.data.into_iter().take(config.page_cap).collect();
    let total = records.len();

    if !sink
        .send(Frame::Init {
            message: None,
            total: Some(total),
        })
        .await
    {
        return;
    }

    let successes = run_batches(
        records,
        config.batch_size,
        config.batch_pacing,
        cancel,
        |record| {
            let sink = sink.clone();
            let cancel = cancel.clone();
            async move { process_record(record, &cancel, &sink).await }
        },
    )
    .await;

    // Closed: summarize, unless the caller already went away.
    if cancel.is_cancelled() {
        return;
    }

    let message = if successes > 0 {
        "all record data sent"
    } else {
        "no records could be loaded, please retry"
    };
    sink.send(Frame::End {
        message: Some(message.to_string()),
        success_count: Some(successes),
    })
    .await;
}

/// Stream one record as a `gameStart` frame.
///
/// A normalization failure is contained here: it becomes a `gameError`
/// frame and an `Err` for the scheduler's success count. Cancellation
/// emits nothing for the record.
async fn process_record(
    record: CatalogRecord,
    cancel: &CancellationToken,
    sink: &FrameSink,
) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(ServiceError::Cancelled);
    }

    let raw_id = record.id.clone();

    match record.normalize() {
        Ok(game) => {
            tracing::debug!(id = %game.id, name = %game.name, "streaming record");
            if sink.send(Frame::GameStart { game }).await {
                Ok(())
            } else {
                Err(ServiceError::Cancelled)
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "record normalization failed");
            let game_id = raw_id.unwrap_or_else(|| RecordId::from("unknown"));
            sink.send(Frame::GameError {
                game_id,
                error: e.to_string(),
            })
            .await;
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchPolicy;
    use reqwest::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_config() -> StreamConfig {
        StreamConfig {
            batch_pacing: Duration::from_millis(1),
            ..Default::default()
        }
    }

    fn client_for(server: &MockServer) -> CatalogClient {
        let policy = FetchPolicy {
            max_retries: 0,
            timeout: Duration::from_secs(2),
            retry_delay: Duration::from_millis(1),
        };
        CatalogClient::with_policy(Url::parse(&server.uri()).unwrap(), policy)
    }

    async fn mount_catalog(server: &MockServer, body: &str) {
        Mock::given(method("GET"))
            .and(path("/api/mod"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/json"))
            .mount(server)
            .await;
    }

    fn catalog_body(count: usize) -> String {
        let records: Vec<String> = (0..count)
            .map(|i| format!(r#"{{"_id":"rec{i}","title":"Module {i}","coverUrl":"https://cdn.example/{i}.jpg"}}"#))
            .collect();
        format!(
            r#"{{"data":{{"totalCount":{count},"data":[{}]}}}}"#,
            records.join(",")
        )
    }

    async fn collect_frames(catalog: &CatalogClient, keyword: &str) -> Vec<Frame> {
        let (tx, mut rx) = mpsc::channel(64);
        let cancel = CancellationToken::new();
        let sink = FrameSink::new(tx, cancel.clone());

        run_search(catalog, keyword, &fast_config(), &cancel, &sink).await;
        drop(sink);

        let mut frames = Vec::new();
        while let Some(frame) = rx.recv().await {
            frames.push(frame);
        }
        frames
    }

    #[tokio::test]
    async fn test_zero_matches_emits_init_and_end_only() {
        let server = MockServer::start().await;
        mount_catalog(&server, r#"{"data":{"totalCount":0,"data":[]}}"#).await;

        let frames = collect_frames(&client_for(&server), "nothing").await;

        assert_eq!(frames.len(), 2);
        assert!(matches!(frames[0], Frame::Init { .. }));
        match &frames[1] {
            Frame::End {
                message,
                success_count,
            } => {
                assert!(message.is_some());
                assert!(success_count.is_none());
            }
            other => panic!("expected End, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_data_frame_count_matches_returned_records() {
        let server = MockServer::start().await;
        mount_catalog(&server, &catalog_body(3)).await;

        let frames = collect_frames(&client_for(&server), "modules").await;

        let starts = frames
            .iter()
            .filter(|f| matches!(f, Frame::GameStart { .. }))
            .count();
        assert_eq!(starts, 3);

        // Second init carries the total.
        assert!(frames
            .iter()
            .any(|f| matches!(f, Frame::Init { total: Some(3), .. })));

        match frames.last().unwrap() {
            Frame::End { success_count, .. } => assert_eq!(*success_count, Some(3)),
            other => panic!("expected End, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_page_cap_bounds_data_frames() {
        let server = MockServer::start().await;
        mount_catalog(&server, &catalog_body(12)).await;

        let frames = collect_frames(&client_for(&server), "popular").await;

        let starts = frames
            .iter()
            .filter(|f| matches!(f, Frame::GameStart { .. }))
            .count();
        assert_eq!(starts, PAGE_CAP);
        assert!(frames
            .iter()
            .any(|f| matches!(f, Frame::Init { total: Some(n), .. } if *n == PAGE_CAP)));
    }

    #[tokio::test]
    async fn test_init_precedes_data_and_terminal_is_last() {
        let server = MockServer::start().await;
        mount_catalog(&server, &catalog_body(5)).await;

        let frames = collect_frames(&client_for(&server), "ordered").await;

        let first_data = frames
            .iter()
            .position(|f| matches!(f, Frame::GameStart { .. }))
            .unwrap();
        let first_init = frames
            .iter()
            .position(|f| matches!(f, Frame::Init { .. }))
            .unwrap();
        assert!(first_init < first_data);
        assert!(frames.last().unwrap().is_terminal());
        // Only the last frame is terminal.
        assert_eq!(frames.iter().filter(|f| f.is_terminal()).count(), 1);
    }

    #[tokio::test]
    async fn test_upstream_failure_emits_single_error_frame() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let frames = collect_frames(&client_for(&server), "broken").await;

        assert!(matches!(frames[0], Frame::Init { .. }));
        assert_eq!(frames.len(), 2);
        assert!(matches!(frames[1], Frame::Error { .. }));
    }

    #[tokio::test]
    async fn test_bad_record_is_contained_as_game_error() {
        let server = MockServer::start().await;
        let body = r#"{"data":{"totalCount":3,"data":[
            {"_id":"good1","title":"Fine Module"},
            {"title":"No Id Module"},
            {"_id":"good2","title":"Also Fine"}
        ]}}"#;
        mount_catalog(&server, body).await;

        let frames = collect_frames(&client_for(&server), "mixed").await;

        let starts = frames
            .iter()
            .filter(|f| matches!(f, Frame::GameStart { .. }))
            .count();
        let errors = frames
            .iter()
            .filter(|f| matches!(f, Frame::GameError { .. }))
            .count();
        assert_eq!(starts, 2);
        assert_eq!(errors, 1);

        match frames.last().unwrap() {
            Frame::End { success_count, .. } => assert_eq!(*success_count, Some(2)),
            other => panic!("expected End, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_disconnected_consumer_stops_upstream_work() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"data":{"totalCount":0,"data":[]}}"#,
                "application/json",
            ))
            .expect(0)
            .mount(&server)
            .await;

        let (tx, rx) = mpsc::channel(64);
        drop(rx);
        let cancel = CancellationToken::new();
        let sink = FrameSink::new(tx, cancel.clone());

        run_search(
            &client_for(&server),
            "gone",
            &fast_config(),
            &cancel,
            &sink,
        )
        .await;

        // The very first send fails, trips the token, and the upstream
        // call never happens.
        assert!(cancel.is_cancelled());
    }
}
