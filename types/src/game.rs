//! Catalog records as served by the backend.
//!
//! Field names follow the wire format. Everything except the identifiers is
//! optional on the wire and defaults to empty, so a sparse record still
//! decodes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::AppId;
use crate::artwork;
use crate::text::strip_markup;

/// One entry of a paginated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub appid: AppId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_community_visible_stats: Option<bool>,
}

impl Game {
    #[must_use]
    pub fn icon_url(&self) -> String {
        artwork::icon_url(self.appid, self.img_icon_url.as_deref())
    }
}

/// Page bookkeeping returned alongside every list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total_games: u64,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamesResponse {
    pub data: Vec<Game>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDetailsResponse {
    pub data: GameDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceOverview {
    #[serde(default)]
    pub currency: String,
    /// Minor units (cents).
    #[serde(default)]
    pub initial: u64,
    /// Minor units (cents), after discount.
    #[serde(rename = "final", default)]
    pub final_price: u64,
    #[serde(default)]
    pub discount_percent: u8,
}

impl PriceOverview {
    #[must_use]
    pub fn discount(&self) -> u8 {
        self.discount_percent.min(100)
    }

    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.discount() > 0
    }

    /// Format the final price with two decimals.
    ///
    /// USD, EUR and GBP get their symbol as a prefix; any other currency is
    /// shown with its code as a suffix. An empty code is treated as USD.
    #[must_use]
    pub fn formatted(&self) -> String {
        format_minor_units(self.final_price, &self.currency)
    }

    #[must_use]
    pub fn formatted_initial(&self) -> String {
        format_minor_units(self.initial, &self.currency)
    }
}

fn format_minor_units(amount: u64, currency: &str) -> String {
    let whole = amount / 100;
    let cents = amount % 100;
    let code = currency.trim().to_ascii_uppercase();
    let symbol = match code.as_str() {
        "" | "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        _ => None,
    };
    match symbol {
        Some(symbol) => format!("{symbol}{whole}.{cents:02}"),
        None => format!("{whole}.{cents:02} {code}"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenshot {
    pub id: u64,
    #[serde(default)]
    pub path_thumbnail: String,
    #[serde(default)]
    pub path_full: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub highlight: Option<bool>,
    #[serde(default)]
    pub webm: BTreeMap<String, String>,
    #[serde(default)]
    pub mp4: BTreeMap<String, String>,
}

impl Movie {
    /// Preferred playable source: mp4 before webm, `max` before `480`.
    #[must_use]
    pub fn best_source(&self) -> Option<&str> {
        [&self.mp4, &self.webm]
            .into_iter()
            .find_map(|sources| {
                sources
                    .get("max")
                    .or_else(|| sources.get("480"))
                    .or_else(|| sources.values().next())
            })
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDate {
    #[serde(default)]
    pub coming_soon: bool,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportInfo {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl SupportInfo {
    /// Support URL, falling back to the email address. Blank values are ignored.
    #[must_use]
    pub fn contact(&self) -> Option<&str> {
        [self.url.as_deref(), self.email.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcRequirements {
    #[serde(default)]
    pub minimum: String,
    #[serde(default)]
    pub recommended: Option<String>,
}

/// Full record for a single catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDetails {
    pub steam_appid: AppId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub detailed_description: String,
    #[serde(default)]
    pub about_the_game: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub header_image: String,
    #[serde(default)]
    pub capsule_image: String,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub background_raw: String,
    #[serde(default)]
    pub developers: Vec<String>,
    #[serde(default)]
    pub publishers: Vec<String>,
    #[serde(default)]
    pub price_overview: Option<PriceOverview>,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
    #[serde(default)]
    pub movies: Vec<Movie>,
    #[serde(default)]
    pub release_date: Option<ReleaseDate>,
    #[serde(default)]
    pub support_info: Option<SupportInfo>,
    #[serde(default)]
    pub supported_languages: Option<String>,
    #[serde(default)]
    pub pc_requirements: Option<PcRequirements>,
}

impl GameDetails {
    /// Languages parsed from the markup-laden `supported_languages` string.
    ///
    /// Absent field means the record predates language data; the storefront
    /// shows English in that case.
    #[must_use]
    pub fn languages(&self) -> Vec<String> {
        let Some(raw) = self.supported_languages.as_deref() else {
            return vec!["English".to_string()];
        };
        strip_markup(raw)
            .split(',')
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// "Free", a formatted price, or nothing when the record has no price snapshot.
    #[must_use]
    pub fn price_label(&self) -> Option<String> {
        if self.is_free {
            return Some("Free".to_string());
        }
        self.price_overview.as_ref().map(PriceOverview::formatted)
    }

    #[must_use]
    pub fn release_label(&self) -> Option<String> {
        let release = self.release_date.as_ref()?;
        let date = release.date.trim();
        match (date.is_empty(), release.coming_soon) {
            (true, true) => Some("Coming soon".to_string()),
            (true, false) => None,
            (false, true) => Some(format!("{date} (coming soon)")),
            (false, false) => Some(date.to_string()),
        }
    }

    #[must_use]
    pub fn support_contact(&self) -> Option<&str> {
        self.support_info.as_ref().and_then(SupportInfo::contact)
    }

    #[must_use]
    pub fn genre_labels(&self) -> Vec<&str> {
        self.genres.iter().map(|g| g.description.as_str()).collect()
    }

    /// Plain-text description: short description when present, otherwise
    /// `about_the_game` with markup removed.
    #[must_use]
    pub fn summary(&self) -> String {
        let short = self.short_description.trim();
        if short.is_empty() {
            strip_markup(&self.about_the_game).trim().to_string()
        } else {
            strip_markup(short).trim().to_string()
        }
    }

    /// First trailer with a playable source, preferring highlighted ones.
    #[must_use]
    pub fn featured_trailer(&self) -> Option<&Movie> {
        let mut playable = self.movies.iter().filter(|movie| movie.best_source().is_some());
        let first = playable.clone().next();
        playable
            .find(|movie| movie.highlight.unwrap_or(false))
            .or(first)
    }
}
