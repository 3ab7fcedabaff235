//! Application state: the catalog listing, the search bar, the detail view,
//! and the plumbing that moves fetch results from spawned tasks into them.
//!
//! Fetches run on tokio tasks and report back over an unbounded channel that
//! [`App::tick`] drains once per frame. Nothing here touches the terminal.

mod detail;
mod init;
mod search;

#[cfg(test)]
mod tests;

use std::time::{Duration, Instant};

use shelf_api::{ApiError, Catalog, CatalogApi, SearchResults};
use shelf_types::pagination::total_pages;
use shelf_types::{AppId, FilterOptions, Game, GameDetails, GamesResponse, SearchHistory, UiOptions};
use tokio::sync::mpsc;

pub use detail::{ArtworkState, DetailView};
pub use init::AppOptions;

use crate::coordinator::{Dispatch, FetchRequest, QueryCoordinator};
use crate::debounce::Debouncer;
use crate::listing::Listing;
use crate::location::Location;
use crate::persistence::HistoryStore;
use crate::ui::{DraftInput, FilterForm, InputMode, SuggestionList};

const NOTICE_TTL: Duration = Duration::from_secs(4);
const SPINNER_INTERVAL: Duration = Duration::from_millis(100);
const MAX_PAGE_JUMP_DIGITS: usize = 6;

/// Loading, loaded, or failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState<T> {
    Loading,
    Ready(T),
    Failed(FetchFailure),
}

impl<T> FetchState<T> {
    #[must_use]
    pub fn ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    #[must_use]
    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            FetchState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Contents of the error panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// What was being loaded, e.g. "Failed to load games".
    pub message: &'static str,
    pub headline: &'static str,
    /// Backend-supplied detail, falling back to the error text.
    pub detail: String,
    pub error: ApiError,
}

impl FetchFailure {
    #[must_use]
    pub fn new(message: &'static str, error: ApiError) -> Self {
        let detail = error
            .detail()
            .map_or_else(|| error.to_string(), str::to_string);
        Self {
            message,
            headline: error.headline(),
            detail,
            error,
        }
    }
}

enum ListingPayload {
    Page(GamesResponse),
    Search(SearchResults),
}

enum FetchOutcome {
    Listing {
        dispatch: Dispatch,
        result: Result<ListingPayload, ApiError>,
    },
    Details {
        seq: u64,
        result: Result<GameDetails, ApiError>,
    },
    Artwork {
        seq: u64,
        url: Option<String>,
    },
}

pub struct App<A: CatalogApi> {
    catalog: Catalog<A>,
    coordinator: QueryCoordinator,
    debouncer: Debouncer<String>,
    search: DraftInput,
    suggestions: Option<SuggestionList>,
    history: SearchHistory,
    history_store: HistoryStore,
    input_mode: InputMode,
    listing: FetchState<Listing>,
    selected: usize,
    page_jump: Option<String>,
    filters: FilterOptions,
    filter_form: FilterForm,
    detail: Option<DetailView>,
    detail_seq: u64,
    notice: Option<(String, Instant)>,
    tx: mpsc::UnboundedSender<FetchOutcome>,
    rx: mpsc::UnboundedReceiver<FetchOutcome>,
    in_flight: usize,
    ui_options: UiOptions,
    spinner: usize,
    last_spinner_tick: Instant,
    started: bool,
    should_quit: bool,
}

impl<A: CatalogApi> App<A> {
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.debouncer.cancel();
        self.should_quit = true;
    }

    /// Dispatch the fetch for the initial location. Must run inside a tokio runtime.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        let initial = self.coordinator.location().clone();
        let dispatch = self.coordinator.sync_from_location(initial);
        self.spawn_listing(dispatch);
    }

    /// Per-frame housekeeping: apply finished fetches, fire the debounce,
    /// expire notices.
    pub fn tick(&mut self, now: Instant) {
        while let Ok(outcome) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.apply_outcome(outcome);
        }

        if let Some(value) = self.debouncer.poll(now) {
            self.fire_debounced(&value);
        }

        if self
            .notice
            .as_ref()
            .is_some_and(|(_, at)| now.duration_since(*at) >= NOTICE_TTL)
        {
            self.notice = None;
        }

        if now.duration_since(self.last_spinner_tick) >= SPINNER_INTERVAL {
            self.last_spinner_tick = now;
            self.spinner = self.spinner.wrapping_add(1);
        }
    }

    // ------------------------------------------------------------------
    // Read-only accessors for rendering
    // ------------------------------------------------------------------

    pub fn listing(&self) -> &FetchState<Listing> {
        &self.listing
    }

    /// Games on the current page that pass the active filters.
    pub fn visible_games(&self) -> Vec<&Game> {
        match &self.listing {
            FetchState::Ready(listing) => self.filters.apply(&listing.games),
            _ => Vec::new(),
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_game(&self) -> Option<&Game> {
        self.visible_games().get(self.selected).copied()
    }

    pub fn location(&self) -> &Location {
        self.coordinator.location()
    }

    pub fn current_page(&self) -> u32 {
        self.coordinator.page()
    }

    /// Total pages of the listing on screen, when known.
    pub fn total_pages(&self) -> Option<u32> {
        self.coordinator.known_total()
    }

    pub fn can_go_back(&self) -> bool {
        self.detail.is_some() || self.coordinator.navigation().can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.coordinator.navigation().can_go_forward()
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn search_draft(&self) -> &DraftInput {
        &self.search
    }

    pub fn suggestions(&self) -> Option<&SuggestionList> {
        self.suggestions.as_ref()
    }

    pub fn search_history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn is_search_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn filters(&self) -> &FilterOptions {
        &self.filters
    }

    pub fn filter_form(&self) -> &FilterForm {
        &self.filter_form
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|(text, _)| text.as_str())
    }

    pub fn ui_options(&self) -> UiOptions {
        self.ui_options
    }

    pub fn spinner_frame(&self) -> usize {
        self.spinner
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn page_size(&self) -> u32 {
        self.catalog.page_size()
    }

    // ------------------------------------------------------------------
    // List navigation
    // ------------------------------------------------------------------

    pub fn select_next(&mut self) {
        let count = self.visible_games().len();
        if count > 0 {
            self.selected = (self.selected + 1).min(count - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.visible_games().len().saturating_sub(1);
    }

    /// Go to `page`. Out-of-range pages and the current page are ignored.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        match self.coordinator.change_page(page) {
            Some(dispatch) => {
                self.spawn_listing(dispatch);
                true
            }
            None => false,
        }
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.current_page().saturating_add(1))
    }

    pub fn prev_page(&mut self) -> bool {
        self.go_to_page(self.current_page().saturating_sub(1))
    }

    pub fn first_page(&mut self) -> bool {
        self.go_to_page(1)
    }

    pub fn last_page(&mut self) -> bool {
        match self.total_pages() {
            Some(total) => self.go_to_page(total),
            None => false,
        }
    }

    /// Digits typed so far for a direct page jump.
    pub fn page_jump(&self) -> Option<&str> {
        self.page_jump.as_deref()
    }

    /// Append a digit to the page jump, starting one if needed.
    pub fn page_jump_push(&mut self, digit: char) {
        if !digit.is_ascii_digit() {
            return;
        }
        let entry = self.page_jump.get_or_insert_with(String::new);
        if entry.len() < MAX_PAGE_JUMP_DIGITS {
            entry.push(digit);
        }
    }

    pub fn page_jump_backspace(&mut self) {
        if let Some(entry) = self.page_jump.as_mut() {
            entry.pop();
            if entry.is_empty() {
                self.page_jump = None;
            }
        }
    }

    pub fn cancel_page_jump(&mut self) {
        self.page_jump = None;
    }

    /// Go to the typed page. Pages outside the selector's range are ignored.
    pub fn submit_page_jump(&mut self) -> bool {
        let Some(entry) = self.page_jump.take() else {
            return false;
        };
        let Ok(page) = entry.parse::<u32>() else {
            return false;
        };
        if page == self.current_page() {
            return false;
        }
        if self.go_to_page(page) {
            return true;
        }
        tracing::debug!(page, "page jump out of range");
        self.set_notice(format!("No page {page}"));
        false
    }

    /// Browser-style back: closes the detail view first, then walks the
    /// location stack.
    pub fn navigate_back(&mut self) -> bool {
        if self.detail.take().is_some() {
            return true;
        }
        match self.coordinator.back() {
            Some(dispatch) => {
                self.sync_search_draft();
                self.spawn_listing(dispatch);
                true
            }
            None => false,
        }
    }

    pub fn navigate_forward(&mut self) -> bool {
        match self.coordinator.forward() {
            Some(dispatch) => {
                self.detail = None;
                self.sync_search_draft();
                self.spawn_listing(dispatch);
                true
            }
            None => false,
        }
    }

    /// Back to the first page of the full catalog.
    pub fn go_home(&mut self) {
        self.detail = None;
        self.debouncer.cancel();
        self.search.clear();
        let dispatch = self.coordinator.search(shelf_types::SearchQuery::empty());
        self.spawn_listing(dispatch);
    }

    /// Re-issue whatever the error panel on screen failed to load.
    pub fn retry(&mut self) -> bool {
        if let Some(detail) = &self.detail {
            if detail.state.failure().is_some() {
                let app = detail.app;
                self.catalog.invalidate_details(app);
                self.open_detail(app);
                return true;
            }
            return false;
        }

        if self.listing.failure().is_none() {
            return false;
        }
        let Some(dispatch) = self.coordinator.retry() else {
            return false;
        };
        match &dispatch.request {
            FetchRequest::Page(page) => {
                self.catalog.invalidate_list(*page);
            }
            FetchRequest::Search(query) => {
                self.catalog.invalidate_search(query);
            }
        }
        tracing::info!(ticket = %dispatch.ticket, "retrying");
        self.spawn_listing(dispatch);
        true
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    pub fn open_filters(&mut self) {
        self.filter_form = FilterForm::from_options(&self.filters);
        self.suggestions = None;
        self.input_mode = InputMode::Filters;
    }

    pub fn close_filters(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn filter_form_mut(&mut self) -> &mut FilterForm {
        &mut self.filter_form
    }

    /// Parse and apply the form. Invalid input keeps the form open.
    pub fn apply_filters(&mut self) -> bool {
        match self.filter_form.parse() {
            Ok(filters) => {
                self.set_notice(if filters.is_active() {
                    format!("Filters: {}", filters.summary())
                } else {
                    "Filters cleared".to_string()
                });
                self.filters = filters;
                self.selected = 0;
                self.input_mode = InputMode::Normal;
                true
            }
            Err(e) => {
                tracing::debug!("Rejected filter input: {e}");
                false
            }
        }
    }

    pub fn clear_filters(&mut self) {
        self.filters = FilterOptions::default();
        self.filter_form.reset();
        self.selected = 0;
        self.input_mode = InputMode::Normal;
        self.set_notice("Filters cleared".to_string());
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn set_notice(&mut self, text: String) {
        self.notice = Some((text, Instant::now()));
    }

    /// Mirror the location's query into the search bar after back/forward.
    fn sync_search_draft(&mut self) {
        self.debouncer.cancel();
        let query = self.coordinator.query().as_str().to_string();
        if self.search.text().trim() != query {
            self.search.set_text(query);
        }
    }

    fn spawn_listing(&mut self, dispatch: Dispatch) {
        self.listing = FetchState::Loading;
        self.selected = 0;
        self.in_flight += 1;

        let catalog = self.catalog.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = match &dispatch.request {
                FetchRequest::Page(page) => catalog.list(*page).await.map(ListingPayload::Page),
                FetchRequest::Search(query) => {
                    catalog.search(query).await.map(ListingPayload::Search)
                }
            };
            let _ = tx.send(FetchOutcome::Listing { dispatch, result });
        });
    }

    fn apply_outcome(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Listing { dispatch, result } => self.apply_listing(&dispatch, result),
            FetchOutcome::Details { seq, result } => self.apply_details(seq, result),
            FetchOutcome::Artwork { seq, url } => self.apply_artwork(seq, url),
        }
    }

    fn apply_listing(&mut self, dispatch: &Dispatch, result: Result<ListingPayload, ApiError>) {
        if !self.coordinator.accepts(dispatch.ticket, &dispatch.request) {
            tracing::debug!(ticket = %dispatch.ticket, "discarding stale result");
            return;
        }

        let payload = match result {
            Ok(payload) => payload,
            Err(error) => {
                let message = match dispatch.request {
                    FetchRequest::Page(_) => "Failed to load games",
                    FetchRequest::Search(_) => "Failed to load search results",
                };
                tracing::warn!(ticket = %dispatch.ticket, "{message}: {error}");
                self.listing = FetchState::Failed(FetchFailure::new(message, error));
                return;
            }
        };

        let page_size = self.catalog.page_size();
        let total = match &payload {
            ListingPayload::Page(response) => response.meta.total_pages,
            ListingPayload::Search(results) => total_pages(results.games.len() as u64, page_size),
        };
        if let Some(follow_up) = self.coordinator.observe_total(total) {
            self.spawn_listing(follow_up);
            return;
        }

        let listing = match payload {
            ListingPayload::Page(response) => Listing::from_page(response),
            ListingPayload::Search(results) => {
                Listing::from_search(&results, self.coordinator.page(), page_size)
            }
        };
        self.listing = FetchState::Ready(listing);
        let count = self.visible_games().len();
        self.selected = self.selected.min(count.saturating_sub(1));
    }

    fn open_detail(&mut self, app: AppId) {
        self.detail_seq += 1;
        let seq = self.detail_seq;
        self.detail = Some(DetailView::loading(app, seq));
        self.in_flight += 1;

        let catalog = self.catalog.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = catalog.details(app).await;
            let _ = tx.send(FetchOutcome::Details { seq, result });
        });
    }

    fn apply_details(&mut self, seq: u64, result: Result<GameDetails, ApiError>) {
        let Some(detail) = self.detail.as_mut().filter(|d| d.seq() == seq) else {
            tracing::debug!(seq, "discarding details for a closed view");
            return;
        };
        match result {
            Ok(details) => {
                let chain = shelf_types::artwork::ArtworkChain::for_details(&details);
                detail.state = FetchState::Ready(details);
                detail.artwork = ArtworkState::Resolving;
                self.in_flight += 1;

                let catalog = self.catalog.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let url = catalog.resolve_artwork(chain).await;
                    let _ = tx.send(FetchOutcome::Artwork { seq, url });
                });
            }
            Err(error) => {
                tracing::warn!(app = %detail.app, "Failed to load game details: {error}");
                detail.state = FetchState::Failed(FetchFailure::new("Failed to load game details", error));
            }
        }
    }

    fn apply_artwork(&mut self, seq: u64, url: Option<String>) {
        if let Some(detail) = self.detail.as_mut().filter(|d| d.seq() == seq) {
            detail.artwork = match url {
                Some(url) => ArtworkState::Found(url),
                None => ArtworkState::Missing,
            };
        }
    }
}
