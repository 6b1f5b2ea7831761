//! Upstream catalog envelope types.
//!
//! The catalog response is untrusted input: every field is defaulted, and
//! records are validated during normalization rather than at decode time so
//! that one malformed record cannot fail the whole page.

use crate::record::{RecordError, RecordId, ResultRecord};
use serde::Deserialize;

/// Top-level catalog search envelope: `{ "data": { ... } }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogEnvelope {
    /// Result page; absent on malformed upstream responses.
    #[serde(default)]
    pub data: Option<CatalogPage>,
}

/// One page of catalog matches.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    /// Total number of matches across all pages.
    #[serde(default)]
    pub total_count: i64,

    /// Matched records; the upstream may return more than one page's worth.
    #[serde(default)]
    pub data: Vec<CatalogRecord>,
}

/// Raw record shape returned by the catalog.
///
/// Unknown fields are ignored; the upstream attaches many that this
/// pipeline never reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    /// Catalog identifier.
    #[serde(rename = "_id", default)]
    pub id: Option<RecordId>,

    /// Display title.
    #[serde(default)]
    pub title: String,

    /// Cover image URL; empty string is treated as absent.
    #[serde(default)]
    pub cover_url: Option<String>,
}

impl CatalogRecord {
    /// Normalize into a [`ResultRecord`], validating required fields.
    pub fn normalize(self) -> Result<ResultRecord, RecordError> {
        let id = self.id.ok_or(RecordError::MissingId)?;

        if self.title.trim().is_empty() {
            return Err(RecordError::EmptyTitle(id));
        }

        let image = self.cover_url.filter(|url| !url.trim().is_empty());

        Ok(ResultRecord {
            id,
            name: self.title,
            image,
        })
    }
}
