//! Search client and the per-session read loop.

use crate::error::ClientError;
use crate::results::LiveResultSet;
use crate::session::SearchSession;
use crate::status::SearchStatus;
use futures::StreamExt;
use modgrid_ndjson::NdjsonParser;
use modgrid_search_protocol::{Frame, ResultRecord};
use reqwest::Url;
use std::time::Duration;
use tokio::sync::mpsc;

/// One observable change to the search UI state.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchUpdate {
    /// Status transition.
    Status(SearchStatus),
    /// Total result count reported by the gateway's `init` frame.
    Total(usize),
    /// The full current result set, re-rendered after each merge.
    Results(Vec<ResultRecord>),
}

/// Client for the streaming search gateway.
///
/// Owns the single authoritative [`SearchSession`]: starting a new search
/// revokes the previous one before the new connection opens.
pub struct SearchClient {
    http: reqwest::Client,
    gateway: Url,
    current: Option<SearchSession>,
    last_keyword: Option<String>,
}

impl SearchClient {
    /// Create a client for the gateway at `gateway` (base URL).
    pub fn new(gateway: Url) -> Self {
        let http = reqwest::Client::builder()
            // No overall timeout - the search response is a long-lived stream
            .connect_timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            gateway,
            current: None,
            last_keyword: None,
        }
    }

    /// Start a search, superseding any search still in flight.
    ///
    /// Returns the channel of updates for the new session. The previous
    /// session's channel simply stops producing updates; its cancellation
    /// is silent.
    ///
    /// An empty keyword never opens a connection: the returned channel
    /// carries a single [`SearchStatus::Idle`] prompt and any in-flight
    /// search is left untouched.
    pub fn search(&mut self, keyword: &str) -> mpsc::Receiver<SearchUpdate> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            let (tx, rx) = mpsc::channel(1);
            let _ = tx.try_send(SearchUpdate::Status(SearchStatus::Idle));
            return rx;
        }
        self.start(keyword.to_string(), false)
    }

    /// Replay the last attempted keyword (the retry affordance).
    ///
    /// Unlike a fresh search, a retry keeps the previous result set
    /// visible until new frames arrive.
    pub fn retry_last(&mut self) -> Option<mpsc::Receiver<SearchUpdate>> {
        let keyword = self.last_keyword.clone()?;
        Some(self.start(keyword, true))
    }

    /// Cancel any in-flight session (component teardown).
    pub fn shutdown(&mut self) {
        if let Some(session) = self.current.take() {
            session.revoke();
        }
    }

    fn start(&mut self, keyword: String, retry: bool) -> mpsc::Receiver<SearchUpdate> {
        if let Some(previous) = self.current.take() {
            tracing::debug!("superseding previous search");
            previous.revoke();
        }

        let session = SearchSession::new();
        self.current = Some(session.clone());
        self.last_keyword = Some(keyword.clone());

        let (tx, rx) = mpsc::channel(256);
        let http = self.http.clone();
        let gateway = self.gateway.clone();

        tokio::spawn(async move {
            run_session(http, gateway, keyword, retry, session, tx).await;
        });

        rx
    }
}

/// State for one session's read loop.
struct SessionRun {
    session: SearchSession,
    tx: mpsc::Sender<SearchUpdate>,
    results: LiveResultSet,
    reached_terminal: bool,
}

impl SessionRun {
    /// Send an update, unless this session has been superseded.
    ///
    /// The authority check here is the supersession guarantee: frames of
    /// a revoked session can never reach the UI.
    async fn emit(&self, update: SearchUpdate) -> Result<(), ClientError> {
        if !self.session.is_authoritative() {
            return Err(ClientError::Cancelled);
        }
        self.tx
            .send(update)
            .await
            .map_err(|_| ClientError::Cancelled)
    }

    async fn handle_frame(&mut self, frame: Frame) -> Result<(), ClientError> {
        match frame {
            Frame::Init {
                total: Some(total), ..
            } => {
                self.emit(SearchUpdate::Total(total)).await?;
                self.emit(SearchUpdate::Status(SearchStatus::Searching {
                    message: format!("found {total} results, loading covers..."),
                }))
                .await?;
            }
            Frame::Init { .. } => {
                self.emit(SearchUpdate::Status(SearchStatus::Searching {
                    message: "Searching...".to_string(),
                }))
                .await?;
            }
            // gameComplete supersedes gameStart for the same id; both merge
            // by upsert, so handling is shared.
            Frame::GameStart { game } | Frame::GameComplete { game } => {
                self.results.upsert(game);
                self.emit(SearchUpdate::Results(self.results.records_in_order()))
                    .await?;
            }
            Frame::GameError { game_id, error } => {
                // Log only: one record's failure never aborts the session.
                tracing::warn!(id = %game_id, error = %error, "record failed to load");
            }
            Frame::Error { message } => {
                self.reached_terminal = true;
                self.emit(SearchUpdate::Status(SearchStatus::Error { message }))
                    .await?;
            }
            Frame::End { message, .. } => {
                self.reached_terminal = true;
                let status = if self.results.is_empty() {
                    SearchStatus::NoResults {
                        message: message
                            .unwrap_or_else(|| "no matching modules found".to_string()),
                    }
                } else {
                    SearchStatus::Success
                };
                self.emit(SearchUpdate::Status(status)).await?;
            }
        }
        Ok(())
    }

    /// Open the gateway connection and decode frames until the stream ends.
    async fn stream(
        &mut self,
        http: &reqwest::Client,
        gateway: &Url,
        keyword: &str,
    ) -> Result<(), ClientError> {
        let mut url = gateway.clone();
        url.set_path("/api/search");
        url.query_pairs_mut().append_pair("q", keyword);

        let request = http.get(url).header("Accept", "text/event-stream");

        let response = tokio::select! {
            _ = self.session.cancelled() => return Err(ClientError::Cancelled),
            response = request.send() => response?,
        };

        if !response.status().is_success() {
            return Err(ClientError::HttpStatus(response.status()));
        }

        let mut stream = response.bytes_stream();
        let mut parser = NdjsonParser::new();

        loop {
            let chunk = tokio::select! {
                _ = self.session.cancelled() => return Err(ClientError::Cancelled),
                chunk = stream.next() => chunk,
            };

            let bytes = match chunk {
                None => break,
                Some(Ok(bytes)) => bytes,
                Some(Err(e)) => return Err(e.into()),
            };

            for line in parser.feed(&bytes) {
                if !self.session.is_authoritative() {
                    return Err(ClientError::Cancelled);
                }
                match serde_json::from_str::<Frame>(&line) {
                    Ok(frame) => self.handle_frame(frame).await?,
                    Err(e) => {
                        // One malformed line does not abort the session.
                        tracing::warn!(error = %e, line = %line, "skipping malformed frame");
                    }
                }
            }
        }

        // Natural close without a terminal frame: apply the same fallback
        // as `end` handling so the UI is never stuck in "searching".
        if !self.reached_terminal {
            let status = if self.results.is_empty() {
                SearchStatus::NoResults {
                    message: "no matching modules found".to_string(),
                }
            } else {
                SearchStatus::Success
            };
            self.emit(SearchUpdate::Status(status)).await?;
        }

        Ok(())
    }
}

async fn run_session(
    http: reqwest::Client,
    gateway: Url,
    keyword: String,
    retry: bool,
    session: SearchSession,
    tx: mpsc::Sender<SearchUpdate>,
) {
    let mut run = SessionRun {
        session,
        tx,
        results: LiveResultSet::new(),
        reached_terminal: false,
    };

    // A fresh search clears the previous result set immediately; a retry
    // keeps it visible until new frames arrive.
    if !retry && run.emit(SearchUpdate::Results(Vec::new())).await.is_err() {
        return;
    }
    if run
        .emit(SearchUpdate::Status(SearchStatus::Searching {
            message: "Searching...".to_string(),
        }))
        .await
        .is_err()
    {
        return;
    }

    match run.stream(&http, &gateway, &keyword).await {
        Ok(()) => {}
        Err(e) if e.is_cancelled() => {
            // Expected: superseded by a newer search or torn down.
            tracing::debug!(keyword, "search superseded or cancelled");
        }
        Err(e) => {
            tracing::warn!(keyword, error = %e, "search failed");
            let _ = run
                .emit(SearchUpdate::Status(SearchStatus::Error {
                    message: e.to_string(),
                }))
                .await;
        }
    }
}
