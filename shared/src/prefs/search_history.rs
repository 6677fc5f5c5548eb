use serde::{Deserialize, Serialize};

use super::{Persisted, SEARCH_HISTORY_KEY};

/// Most recent first, unique, capped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHistory {
    entries: Vec<String>,
    limit: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistorySnapshot {
    pub history: Vec<String>,
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new(crate::MAX_SEARCH_HISTORY)
    }
}

impl SearchHistory {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Returns true when entries beyond the new cap were dropped.
    pub fn set_limit(&mut self, limit: usize) -> bool {
        self.limit = limit.max(1);
        let before = self.entries.len();
        self.entries.truncate(self.limit);
        self.entries.len() != before
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Blank queries are ignored. A repeated query moves to the front.
    pub fn add(&mut self, query: &str) -> bool {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.entries.retain(|q| q != trimmed);
        self.entries.insert(0, trimmed.to_string());
        self.entries.truncate(self.limit);
        true
    }

    pub fn remove(&mut self, query: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|q| q != query);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Persisted for SearchHistory {
    const KEY: &'static str = SEARCH_HISTORY_KEY;
    type Snapshot = SearchHistorySnapshot;

    fn snapshot(&self) -> SearchHistorySnapshot {
        SearchHistorySnapshot {
            history: self.entries.clone(),
        }
    }

    /// Re-applies the cap and uniqueness in case storage was edited.
    fn restore(&mut self, snapshot: SearchHistorySnapshot) {
        self.entries.clear();
        for query in snapshot.history.iter().rev() {
            self.add(query);
        }
    }
}
