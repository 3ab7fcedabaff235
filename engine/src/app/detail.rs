//! The single-game view.

use shelf_api::CatalogApi;
use shelf_types::{AppId, GameDetails};

use super::{App, FetchState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtworkState {
    /// Waiting on the details record, or walking the fallback chain.
    Resolving,
    Found(String),
    /// Every candidate failed.
    Missing,
}

#[derive(Debug, Clone)]
pub struct DetailView {
    pub app: AppId,
    pub state: FetchState<GameDetails>,
    pub artwork: ArtworkState,
    pub scroll: u16,
    seq: u64,
}

impl DetailView {
    pub(super) fn loading(app: AppId, seq: u64) -> Self {
        Self {
            app,
            state: FetchState::Loading,
            artwork: ArtworkState::Resolving,
            scroll: 0,
            seq,
        }
    }

    pub(super) fn seq(&self) -> u64 {
        self.seq
    }

    #[must_use]
    pub fn details(&self) -> Option<&GameDetails> {
        self.state.ready()
    }
}

impl<A: CatalogApi> App<A> {
    /// Open the detail view for the highlighted game.
    pub fn open_selected(&mut self) -> bool {
        let Some(app) = self.selected_game().map(|game| game.appid) else {
            return false;
        };
        self.open_detail(app);
        true
    }

    /// Open the detail view for any App ID.
    pub fn show_details(&mut self, app: AppId) {
        self.open_detail(app);
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    pub fn scroll_detail(&mut self, delta: i16) {
        if let Some(detail) = self.detail.as_mut() {
            detail.scroll = detail.scroll.saturating_add_signed(delta);
        }
    }
}
