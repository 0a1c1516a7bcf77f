//! Date-keyed symbol cache for historical replays.
//!
//! The cache is populated at most once. Historical feed snapshots are
//! immutable, so there is no eviction and no expiry.

use crate::domain::feed::FeedRecord;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct FeedCache {
    entries: HashMap<NaiveDate, Vec<String>>,
    populated: bool,
}

impl FeedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a successful population has already happened.
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// Load `records` into an unpopulated cache, later dates overwriting
    /// earlier ones. Returns `false` and leaves the cache untouched if it was
    /// already populated.
    pub fn populate(&mut self, records: Vec<FeedRecord>) -> bool {
        if self.populated {
            return false;
        }
        for record in records {
            self.entries.insert(record.date, record.symbols);
        }
        self.populated = true;
        true
    }

    pub fn get(&self, date: NaiveDate) -> Option<&[String]> {
        self.entries.get(&date).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First and last cached dates.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.entries.keys().min()?;
        let max = self.entries.keys().max()?;
        Some((*min, *max))
    }
}
