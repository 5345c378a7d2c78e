//! Natural-key deduplication
//!
//! Records are keyed by profile URL when present, otherwise by username.
//! First occurrence wins; later duplicates are dropped.

use std::collections::HashSet;

use crate::models::HarvestedRecord;

/// Tracks natural keys seen during one harvest
#[derive(Debug, Default)]
pub struct SeenSet {
    keys: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from previously persisted keys, for resumed harvests
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Admit a record, returning false when its key was already seen
    ///
    /// Records without a natural key are never admitted.
    pub fn admit(&mut self, record: &HarvestedRecord) -> bool {
        if !record.has_natural_key() {
            return false;
        }
        self.keys.insert(record.natural_key().to_string())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Deduplicate a record batch in place, keeping first occurrences
pub fn dedup_records(records: Vec<HarvestedRecord>) -> Vec<HarvestedRecord> {
    let mut seen = SeenSet::new();
    records
        .into_iter()
        .filter(|record| seen.admit(record))
        .collect()
}
