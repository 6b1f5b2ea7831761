//! Stream frame types.

use crate::record::{RecordId, ResultRecord};
use serde::{Deserialize, Serialize};

/// One newline-delimited JSON message in the search response stream.
///
/// Frames are ordered within a stream: `init` precedes all per-record
/// frames, and `end`/`error` is last. Per-record frames within the same
/// fan-out batch may arrive in any relative order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Frame {
    /// Search started, or result count known.
    Init {
        /// Human-readable status message.
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        /// Number of records that will be streamed, once known.
        #[serde(skip_serializing_if = "Option::is_none")]
        total: Option<usize>,
    },

    /// One record is available (basic fields, no enrichment).
    GameStart {
        /// The normalized record.
        game: ResultRecord,
    },

    /// One record is finalized with enriched fields.
    ///
    /// Reserved for a later cover-fetch phase; consumers must handle it
    /// (it supersedes `gameStart` for the same id) but the current
    /// gateway never emits it.
    GameComplete {
        /// The normalized record.
        game: ResultRecord,
    },

    /// One record failed; the rest of the stream is unaffected.
    #[serde(rename_all = "camelCase")]
    GameError {
        /// Id of the failed record.
        game_id: RecordId,
        /// Human-readable failure description.
        error: String,
    },

    /// Fatal failure; the stream closes after this frame.
    Error {
        /// Human-readable failure description.
        message: String,
    },

    /// Stream complete.
    #[serde(rename_all = "camelCase")]
    End {
        /// Human-readable summary.
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        /// Number of records streamed successfully.
        #[serde(skip_serializing_if = "Option::is_none")]
        success_count: Option<usize>,
    },
}

impl Frame {
    /// True for the frames that terminate a stream (`end` / `error`).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Frame::End { .. } | Frame::Error { .. })
    }

    /// Encode as one NDJSON line, including the trailing newline.
    ///
    /// Serialization of these types cannot fail (no non-string map keys,
    /// no fallible `Serialize` impls), so this is infallible.
    pub fn to_ndjson_line(&self) -> String {
        let mut line = serde_json::to_string(self).expect("frame serialization cannot fail");
        line.push('\n');
        line
    }
}
