//! Cached catalog reads and client-side search.

use shelf_types::artwork::ArtworkChain;
use shelf_types::{AppId, Game, GameDetails, GamesResponse, SearchQuery};

use crate::cache::QueryCache;
use crate::{ApiError, CatalogApi};

const MAX_CACHED_PAGES: usize = 256;
const MAX_CACHED_DETAILS: usize = 128;
const MAX_CACHED_SEARCHES: usize = 32;

/// `(page, limit)` key of a list request.
pub type ListKey = (u32, u32);

/// Games whose name (or App ID) matched a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub query: SearchQuery,
    pub games: Vec<Game>,
    /// List pages examined to produce `games`.
    pub scanned_pages: u32,
    /// Total list pages the backend reported.
    pub catalog_pages: u32,
}

impl SearchResults {
    /// True when the scan stopped before reaching the end of the catalog.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.scanned_pages < self.catalog_pages
    }
}

/// Catalog reads behind keyed caches.
///
/// Clones share caches, so handing a clone to each spawned task still gives
/// one request per key.
#[derive(Clone)]
pub struct Catalog<A: CatalogApi> {
    api: A,
    lists: QueryCache<ListKey, GamesResponse>,
    details: QueryCache<AppId, GameDetails>,
    searches: QueryCache<SearchQuery, SearchResults>,
    page_size: u32,
    max_scan_pages: u32,
}

impl<A: CatalogApi> Catalog<A> {
    pub fn new(api: A, page_size: u32, max_scan_pages: u32) -> Self {
        Self {
            api,
            lists: QueryCache::with_capacity(MAX_CACHED_PAGES),
            details: QueryCache::with_capacity(MAX_CACHED_DETAILS),
            searches: QueryCache::with_capacity(MAX_CACHED_SEARCHES),
            page_size: page_size.max(1),
            max_scan_pages: max_scan_pages.max(1),
        }
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub async fn list(&self, page: u32) -> Result<GamesResponse, ApiError> {
        let limit = self.page_size;
        let api = self.api.clone();
        self.lists
            .get_or_fetch((page, limit), move || async move {
                api.list_games(page, limit).await
            })
            .await
    }

    pub async fn details(&self, app: AppId) -> Result<GameDetails, ApiError> {
        let api = self.api.clone();
        self.details
            .get_or_fetch(app, move || async move { api.game_details(app).await })
            .await
    }

    /// Search by name, and by App ID when the query is numeric.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResults, ApiError> {
        let catalog = self.clone();
        let owned = query.clone();
        self.searches
            .get_or_fetch(query.clone(), move || async move {
                catalog.scan(owned).await
            })
            .await
    }

    async fn scan(&self, query: SearchQuery) -> Result<SearchResults, ApiError> {
        let mut games: Vec<Game> = Vec::new();

        if let Some(app) = query.as_app_id() {
            match self.details(app).await {
                Ok(details) => games.push(Game {
                    appid: details.steam_appid,
                    name: details.name,
                    img_icon_url: None,
                    img_logo_url: None,
                    has_community_visible_stats: None,
                }),
                Err(err) if err.is_not_found() => {
                    tracing::debug!(%app, "no catalog entry for numeric query");
                }
                Err(err) => return Err(err),
            }
        }

        let mut page = 1;
        let mut scanned_pages = 0;
        let mut catalog_pages = 0;
        loop {
            let response = self.list(page).await?;
            scanned_pages += 1;
            catalog_pages = response.meta.total_pages;
            let exhausted = response.data.is_empty();

            for game in response.data {
                if query.matches_name(&game.name) && !games.iter().any(|g| g.appid == game.appid) {
                    games.push(game);
                }
            }

            if exhausted || page >= catalog_pages || scanned_pages >= self.max_scan_pages {
                break;
            }
            page += 1;
        }

        tracing::debug!(
            query = %query,
            matches = games.len(),
            scanned_pages,
            catalog_pages,
            "search scan finished"
        );
        Ok(SearchResults {
            query,
            games,
            scanned_pages,
            catalog_pages,
        })
    }

    /// First candidate in `chain` that resolves, or `None` once exhausted.
    pub async fn resolve_artwork(&self, mut chain: ArtworkChain) -> Option<String> {
        while let Some(candidate) = chain.current().map(str::to_string) {
            if self.api.artwork_exists(&candidate).await {
                return Some(candidate);
            }
            tracing::debug!(url = %candidate, "artwork candidate missing");
            chain.advance();
        }
        None
    }

    pub fn invalidate_list(&self, page: u32) -> bool {
        self.lists.invalidate(&(page, self.page_size))
    }

    pub fn invalidate_details(&self, app: AppId) -> bool {
        self.details.invalidate(&app)
    }

    pub fn invalidate_search(&self, query: &SearchQuery) -> bool {
        self.searches.invalidate(query)
    }

    #[must_use]
    pub fn cached_list(&self, page: u32) -> Option<GamesResponse> {
        self.lists.peek(&(page, self.page_size))
    }
}
