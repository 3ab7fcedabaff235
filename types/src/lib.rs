//! Core domain types for Shelf.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

pub mod artwork;
mod filters;
mod game;
mod history;
pub mod pagination;
mod text;

pub use filters::{FilterError, FilterOptions};
pub use game::{
    Game, GameDetails, GameDetailsResponse, GamesResponse, Genre, Movie, PaginationMeta,
    PcRequirements, PriceOverview, ReleaseDate, Screenshot, SupportInfo,
};
pub use history::{MAX_SEARCH_HISTORY, SearchHistory};
pub use pagination::{DEFAULT_PAGE_SIZE, PageItem, clamp_page, page_items};
pub use text::{sanitize_display, strip_markup};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// AppId
// ============================================================================

/// Catalog identifier. Always a positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct AppId(NonZeroU32);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppIdError {
    #[error("app id must be a positive integer")]
    Zero,
    #[error("app id `{0}` is not a number")]
    NotNumeric(String),
}

impl AppId {
    pub fn new(value: u32) -> Result<Self, AppIdError> {
        NonZeroU32::new(value).map(Self).ok_or(AppIdError::Zero)
    }

    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<u32> for AppId {
    type Error = AppIdError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AppId> for u32 {
    fn from(value: AppId) -> Self {
        value.get()
    }
}

impl FromStr for AppId {
    type Err = AppIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value = trimmed
            .parse::<u32>()
            .map_err(|_| AppIdError::NotNumeric(trimmed.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// UiOptions
// ============================================================================

/// UI configuration options derived from config/environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
}

// ============================================================================
// SearchQuery
// ============================================================================

/// A trimmed search string. Empty means "no search active".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.len() == value.len() {
            Self(value)
        } else {
            Self(trimmed.to_string())
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Queries like `"220"` double as App ID lookups.
    #[must_use]
    pub fn as_app_id(&self) -> Option<AppId> {
        self.0.parse().ok()
    }

    /// Case-insensitive substring match against a game name.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        if self.0.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.0.to_lowercase())
    }
}

impl From<String> for SearchQuery {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SearchQuery {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<SearchQuery> for String {
    fn from(value: SearchQuery) -> Self {
        value.0
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
