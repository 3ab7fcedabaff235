//! Search bar editing, debounce, submission, and history.

use std::time::Instant;

use shelf_api::CatalogApi;
use shelf_types::SearchQuery;

use super::App;
use crate::ui::{DraftInput, InputMode, SuggestionList};

impl<A: CatalogApi> App<A> {
    pub fn focus_search(&mut self) {
        self.input_mode = InputMode::Search;
        self.search.move_cursor_end();
        self.suggestions = Some(SuggestionList::build(&self.history));
    }

    /// Leave the search bar. A pending debounced search still fires.
    pub fn blur_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.suggestions = None;
    }

    pub fn search_insert_char(&mut self, c: char, now: Instant) {
        self.edit_search(now, |draft| draft.enter_char(c));
    }

    pub fn search_paste(&mut self, text: &str, now: Instant) {
        self.edit_search(now, |draft| draft.enter_text(text));
    }

    pub fn search_backspace(&mut self, now: Instant) {
        self.edit_search(now, DraftInput::delete_char);
    }

    pub fn search_delete_forward(&mut self, now: Instant) {
        self.edit_search(now, DraftInput::delete_char_forward);
    }

    pub fn search_delete_word(&mut self, now: Instant) {
        self.edit_search(now, DraftInput::delete_word_backwards);
    }

    pub fn search_cursor_left(&mut self) {
        self.search.move_cursor_left();
    }

    pub fn search_cursor_right(&mut self) {
        self.search.move_cursor_right();
    }

    pub fn search_cursor_home(&mut self) {
        self.search.reset_cursor();
    }

    pub fn search_cursor_end(&mut self) {
        self.search.move_cursor_end();
    }

    pub fn suggestion_next(&mut self) {
        if let Some(list) = self.suggestions.as_mut() {
            list.select_next();
        }
    }

    pub fn suggestion_prev(&mut self) {
        if let Some(list) = self.suggestions.as_mut() {
            list.select_prev();
        }
    }

    /// Every edit restarts the quiet period with the new text.
    fn edit_search(&mut self, now: Instant, edit: impl FnOnce(&mut DraftInput)) {
        let before = self.search.text().to_string();
        edit(&mut self.search);
        if self.search.text() == before {
            return;
        }
        if let Some(list) = self.suggestions.as_mut() {
            list.clear_selection();
        }
        self.debouncer.schedule(self.search.text().to_string(), now);
    }

    /// Enter in the search bar: the highlighted suggestion if any, otherwise
    /// the typed text. Blank input does nothing.
    pub fn submit_search(&mut self) -> bool {
        if let Some(text) = self
            .suggestions
            .as_ref()
            .and_then(SuggestionList::selected)
            .map(|s| s.text.clone())
        {
            return self.submit_text(text);
        }
        let text = self.search.text().to_string();
        self.submit_text(text)
    }

    /// Pick the suggestion at `index` (recent search or category).
    pub fn choose_suggestion(&mut self, index: usize) -> bool {
        let Some(text) = self
            .suggestions
            .as_ref()
            .and_then(|list| list.items().get(index))
            .map(|s| s.text.clone())
        else {
            return false;
        };
        self.submit_text(text)
    }

    fn submit_text(&mut self, text: String) -> bool {
        self.debouncer.cancel();
        let query = SearchQuery::new(text);
        if query.is_empty() {
            return false;
        }
        self.search.set_text(query.as_str().to_string());
        self.record_history(&query);
        self.blur_search();
        self.detail = None;
        let dispatch = self.coordinator.search(query);
        self.spawn_listing(dispatch);
        true
    }

    /// Empty the search bar and show the full catalog immediately.
    pub fn clear_search(&mut self) {
        self.debouncer.cancel();
        self.search.clear();
        if let Some(list) = self.suggestions.as_mut() {
            list.clear_selection();
        }
        self.detail = None;
        let dispatch = self.coordinator.search(SearchQuery::empty());
        self.spawn_listing(dispatch);
    }

    pub(super) fn fire_debounced(&mut self, value: &str) {
        let query = SearchQuery::new(value);
        if query.is_empty() {
            tracing::debug!("debounce fired with blank input; nothing dispatched");
            return;
        }
        self.detail = None;
        let dispatch = self.coordinator.search(query);
        self.spawn_listing(dispatch);
    }

    fn record_history(&mut self, query: &SearchQuery) {
        if !self.history.record(query) {
            return;
        }
        if let Err(e) = self.history_store.save(&self.history) {
            tracing::warn!("Failed to save search history: {e:#}");
            self.set_notice("Could not save search history".to_string());
        }
    }
}
