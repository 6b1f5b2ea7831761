//! Normalized result records.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Record identifier as returned by the upstream catalog.
///
/// The catalog uses opaque string ids, but numeric ids also appear in
/// older payloads, so both forms are accepted on the wire. Ids are stable
/// and unique within one search session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Opaque string identifier (the common case).
    Text(String),
    /// Numeric identifier.
    Number(i64),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Text(s) => f.write_str(s),
            RecordId::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Number(n)
    }
}

/// One normalized search result.
///
/// Produced by the gateway from a raw catalog record, consumed by the
/// stream consumer. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Stable identifier, unique within a session.
    pub id: RecordId,

    /// Display name.
    pub name: String,

    /// Cover image reference, absent when the catalog has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ResultRecord {
    /// Create a new result record.
    pub fn new(id: impl Into<RecordId>, name: impl Into<String>, image: Option<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image,
        }
    }
}

/// Failure to normalize one upstream record.
///
/// Contained at the record boundary: one bad record never fails the
/// surrounding search.
#[derive(Debug, Clone, Error)]
pub enum RecordError {
    /// The upstream record carried no identifier.
    #[error("catalog record has no id")]
    MissingId,

    /// The upstream record had an empty display title.
    #[error("catalog record {0} has an empty title")]
    EmptyTitle(RecordId),
}
