//! Search history persistence.
//!
//! The history is a JSON array of strings. Anything unreadable is logged and
//! treated as an empty history; a bad file never blocks startup.

use std::path::{Path, PathBuf};

use anyhow::Context;
use shelf_types::SearchHistory;

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: Option<PathBuf>,
}

impl HistoryStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// `~/.shelf/search_history.json`, or an in-memory store when there is
    /// no home directory.
    #[must_use]
    pub fn at_default_path() -> Self {
        Self {
            path: shelf_config::history_path(),
        }
    }

    /// Never reads or writes.
    #[must_use]
    pub fn in_memory() -> Self {
        Self { path: None }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load(&self) -> SearchHistory {
        let Some(path) = self.path.as_deref() else {
            return SearchHistory::default();
        };
        shelf_utils::recover_bak_file(path);
        if !path.exists() {
            return SearchHistory::default();
        }

        match std::fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str::<SearchHistory>(&data) {
                Ok(history) => {
                    tracing::debug!(
                        entries = history.len(),
                        "Loaded search history from {}",
                        path.display()
                    );
                    history
                }
                Err(e) => {
                    tracing::warn!("Discarding malformed search history: {e}");
                    SearchHistory::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read search history: {e}");
                SearchHistory::default()
            }
        }
    }

    pub fn save(&self, history: &SearchHistory) -> anyhow::Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        let json = serde_json::to_string(history)?;
        shelf_utils::atomic_write(path, json.as_bytes())
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use shelf_types::SearchQuery;

    use super::*;

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("search_history.json"));
        let mut history = SearchHistory::default();
        history.record(&SearchQuery::new("portal"));
        history.record(&SearchQuery::new("half-life"));
        store.save(&history).unwrap();

        let raw = std::fs::read_to_string(store.path().unwrap()).unwrap();
        assert_eq!(raw, r#"["half-life","portal"]"#);
        assert_eq!(store.load(), history);
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("nope.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn malformed_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search_history.json");
        std::fs::write(&path, "{\"not\": \"an array\"}").unwrap();
        assert!(HistoryStore::new(path.clone()).load().is_empty());

        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(HistoryStore::new(path).load().is_empty());
    }

    #[test]
    fn oversized_file_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search_history.json");
        std::fs::write(&path, r#"["a","b","c","d","e","f","g"]"#).unwrap();
        let history = HistoryStore::new(path).load();
        assert_eq!(history.entries(), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn in_memory_store_is_inert() {
        let store = HistoryStore::in_memory();
        let mut history = SearchHistory::default();
        history.record(&SearchQuery::new("x"));
        store.save(&history).unwrap();
        assert!(store.load().is_empty());
    }
}
