//! Core engine for Shelf: query coordination, debounced search, and the
//! application state the TUI renders.
//!
//! This crate contains the App state machine without TUI dependencies.

mod app;
mod coordinator;
mod debounce;
mod listing;
mod location;
mod persistence;
mod ui;

pub use app::{App, AppOptions, ArtworkState, DetailView, FetchFailure, FetchState};
pub use coordinator::{Dispatch, FetchRequest, QueryCoordinator, Ticket};
pub use debounce::{DEFAULT_QUIET_PERIOD, Debouncer};
pub use listing::{Listing, ListingSource};
pub use location::{Location, NavigationHistory};
pub use persistence::HistoryStore;
pub use ui::{
    CATEGORIES, DraftInput, FilterField, FilterForm, InputMode, SEARCH_TIPS, Suggestion,
    SuggestionKind, SuggestionList,
};

pub use shelf_api::{ApiError, Catalog, CatalogApi, HttpCatalog, SearchResults};
pub use shelf_config::{Settings, ShelfConfig, TuiMode};
pub use shelf_types::{
    AppId, FilterOptions, Game, GameDetails, PageItem, SearchHistory, SearchQuery, UiOptions,
    page_items,
};
