//! The page of games currently on screen, from either the catalog or a search.

use shelf_api::SearchResults;
use shelf_types::pagination::total_pages;
use shelf_types::{Game, GamesResponse, PaginationMeta, SearchQuery};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingSource {
    Catalog,
    Search {
        query: SearchQuery,
        /// The scan stopped before the end of the catalog.
        partial: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub games: Vec<Game>,
    pub meta: PaginationMeta,
    pub source: ListingSource,
}

impl Listing {
    #[must_use]
    pub fn from_page(response: GamesResponse) -> Self {
        Self {
            games: response.data,
            meta: response.meta,
            source: ListingSource::Catalog,
        }
    }

    /// Slice one page out of the full result set. `page` is clamped.
    #[must_use]
    pub fn from_search(results: &SearchResults, page: u32, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let total_games = results.games.len() as u64;
        let total = total_pages(total_games, page_size);
        let page = page.clamp(1, total.max(1));
        let start = ((page - 1) as usize).saturating_mul(page_size as usize);
        let games: Vec<Game> = results
            .games
            .iter()
            .skip(start)
            .take(page_size as usize)
            .cloned()
            .collect();

        Self {
            games,
            meta: PaginationMeta {
                page,
                limit: page_size,
                total_games,
                total_pages: total,
                has_next_page: page < total,
                has_prev_page: page > 1,
            },
            source: ListingSource::Search {
                query: results.query.clone(),
                partial: results.is_partial(),
            },
        }
    }

    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.meta.total_pages
    }

    #[must_use]
    pub fn is_search(&self) -> bool {
        matches!(self.source, ListingSource::Search { .. })
    }

    /// Heading such as `All Games (1234)` or `Results for "portal" (2)`.
    #[must_use]
    pub fn title(&self) -> String {
        match &self.source {
            ListingSource::Catalog => format!("All Games ({})", self.meta.total_games),
            ListingSource::Search { query, partial } => {
                let more = if *partial { "+" } else { "" };
                format!(
                    "Results for \"{query}\" ({}{more})",
                    self.meta.total_games
                )
            }
        }
    }
}
