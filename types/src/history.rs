//! Recent search queries.
//!
//! Entries are stored most-recent-first and compared case-sensitively, so
//! `"portal"` and `"Portal"` are two separate entries.

use serde::{Deserialize, Serialize};

use crate::SearchQuery;

pub const MAX_SEARCH_HISTORY: usize = 5;

/// Bounded, de-duplicated list of submitted searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SearchHistory {
    entries: Vec<String>,
}

impl SearchHistory {
    /// Build from persisted entries, restoring the invariants: blank entries
    /// dropped, first occurrence wins, at most [`MAX_SEARCH_HISTORY`] kept.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = String>) -> Self {
        let mut history = Self::default();
        for entry in entries {
            let entry = entry.trim();
            if entry.is_empty() || history.entries.iter().any(|e| e == entry) {
                continue;
            }
            history.entries.push(entry.to_string());
            if history.entries.len() == MAX_SEARCH_HISTORY {
                break;
            }
        }
        history
    }

    /// Move `query` to the front. Empty queries are ignored.
    ///
    /// Returns `true` if the list changed.
    pub fn record(&mut self, query: &SearchQuery) -> bool {
        if query.is_empty() {
            return false;
        }
        if self.entries.first().is_some_and(|e| e == query.as_str()) {
            return false;
        }
        self.entries.retain(|e| e != query.as_str());
        self.entries.insert(0, query.as_str().to_string());
        self.entries.truncate(MAX_SEARCH_HISTORY);
        true
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<String>> for SearchHistory {
    fn from(entries: Vec<String>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<SearchHistory> for Vec<String> {
    fn from(history: SearchHistory) -> Self {
        history.entries
    }
}
