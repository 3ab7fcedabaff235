//! Application construction.

use std::time::{Duration, Instant};

use shelf_api::{Catalog, CatalogApi, HttpCatalog};
use shelf_config::Settings;
use shelf_types::{FilterOptions, UiOptions};
use tokio::sync::mpsc;

use super::{App, FetchState};
use crate::coordinator::QueryCoordinator;
use crate::debounce::Debouncer;
use crate::location::Location;
use crate::persistence::HistoryStore;
use crate::ui::{DraftInput, FilterForm, InputMode};

pub struct AppOptions {
    pub location: Location,
    pub debounce: Duration,
    pub ui: UiOptions,
    pub history: HistoryStore,
}

impl AppOptions {
    #[must_use]
    pub fn from_settings(settings: &Settings, location: Location) -> Self {
        Self {
            location,
            debounce: settings.debounce,
            ui: UiOptions {
                ascii_only: settings.ascii_only,
                high_contrast: settings.high_contrast,
            },
            history: HistoryStore::at_default_path(),
        }
    }
}

impl App<HttpCatalog> {
    /// HTTP-backed app from resolved settings.
    pub fn from_settings(settings: &Settings, location: Location) -> anyhow::Result<Self> {
        let api = HttpCatalog::new(settings.base_url.clone(), settings.request_timeout)?;
        tracing::info!(base_url = %settings.base_url, page_size = settings.page_size, "catalog configured");
        let catalog = Catalog::new(api, settings.page_size, settings.max_scan_pages);
        Ok(Self::new(catalog, AppOptions::from_settings(settings, location)))
    }
}

impl<A: CatalogApi> App<A> {
    /// Build without fetching; call [`App::start`] once a runtime is running.
    pub fn new(catalog: Catalog<A>, options: AppOptions) -> Self {
        let AppOptions {
            location,
            debounce,
            ui,
            history,
        } = options;
        let (tx, rx) = mpsc::unbounded_channel();
        let search = DraftInput::with_text(location.query().as_str());
        let search_history = history.load();

        Self {
            catalog,
            coordinator: QueryCoordinator::new(location),
            debouncer: Debouncer::new(debounce),
            search,
            suggestions: None,
            history: search_history,
            history_store: history,
            input_mode: InputMode::Normal,
            listing: FetchState::Loading,
            selected: 0,
            page_jump: None,
            filters: FilterOptions::default(),
            filter_form: FilterForm::default(),
            detail: None,
            detail_seq: 0,
            notice: None,
            tx,
            rx,
            in_flight: 0,
            ui_options: ui,
            spinner: 0,
            last_spinner_tick: Instant::now(),
            started: false,
            should_quit: false,
        }
    }
}
