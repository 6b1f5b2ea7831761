//! Live result set.

use modgrid_search_protocol::{RecordId, ResultRecord};
use std::collections::HashMap;

/// Id-keyed set of results for one search session.
///
/// Display order follows the arrival order of each id's first insertion;
/// later frames for the same id overwrite the stored record in place
/// (`gameComplete` supersedes `gameStart`). Owned exclusively by one
/// consumer flow and replaced wholesale when a new search supersedes it.
#[derive(Debug, Default, Clone)]
pub struct LiveResultSet {
    order: Vec<RecordId>,
    records: HashMap<RecordId, ResultRecord>,
}

impl LiveResultSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record keyed by its id.
    pub fn upsert(&mut self, record: ResultRecord) {
        if self.records.insert(record.id.clone(), record.clone()).is_none() {
            self.order.push(record.id);
        }
    }

    /// Current records in display order.
    pub fn records_in_order(&self) -> Vec<ResultRecord> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect()
    }

    /// Number of distinct records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no records have arrived.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
