mod filter_form;
mod input;
mod suggestions;

pub use filter_form::{FilterField, FilterForm};
pub use input::{DraftInput, InputMode};
pub use suggestions::{CATEGORIES, SEARCH_TIPS, Suggestion, SuggestionKind, SuggestionList};
