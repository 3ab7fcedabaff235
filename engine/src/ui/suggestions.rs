//! Search dropdown: recent searches followed by fixed categories.

use shelf_types::SearchHistory;

pub const CATEGORIES: [&str; 10] = [
    "Action",
    "Adventure",
    "RPG",
    "Strategy",
    "Simulation",
    "Sports",
    "Racing",
    "Indie",
    "Casual",
    "Puzzle",
];

pub const SEARCH_TIPS: [&str; 3] = [
    "Search by game name: \"Half-Life\", \"Portal\"",
    "Search by category: \"Action\", \"RPG\"",
    "Search by App ID: \"220\", \"400\"",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Recent,
    Category,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub text: String,
    pub kind: SuggestionKind,
}

/// Entries shown under the search bar while it has focus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionList {
    items: Vec<Suggestion>,
    selected: Option<usize>,
}

impl SuggestionList {
    #[must_use]
    pub fn build(history: &SearchHistory) -> Self {
        let recent = history.entries().iter().map(|text| Suggestion {
            text: text.clone(),
            kind: SuggestionKind::Recent,
        });
        let categories = CATEGORIES.iter().map(|category| Suggestion {
            text: (*category).to_string(),
            kind: SuggestionKind::Category,
        });
        Self {
            items: recent.chain(categories).collect(),
            selected: None,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[Suggestion] {
        &self.items
    }

    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Suggestion> {
        self.selected.and_then(|i| self.items.get(i))
    }

    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        });
    }

    pub fn select_prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let last = self.items.len() - 1;
        self.selected = Some(match self.selected {
            Some(0) | None => last,
            Some(i) => i - 1,
        });
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn recent(&self) -> impl Iterator<Item = (usize, &Suggestion)> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, s)| s.kind == SuggestionKind::Recent)
    }

    pub fn categories(&self) -> impl Iterator<Item = (usize, &Suggestion)> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, s)| s.kind == SuggestionKind::Category)
    }
}
