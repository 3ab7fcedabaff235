//! Client-side result filters.

use thiserror::Error;

use crate::Game;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("{field} must be a whole number, got `{value}`")]
    NotNumeric { field: &'static str, value: String },
    #[error("min app id {min} is greater than max app id {max}")]
    InvertedRange { min: u32, max: u32 },
}

/// App ID range plus name terms to exclude.
///
/// The default value filters nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub min_app_id: Option<u32>,
    pub max_app_id: Option<u32>,
    /// Lowercased, trimmed, non-empty.
    exclude_terms: Vec<String>,
}

impl FilterOptions {
    /// Parse the raw text of the three filter fields. Blank fields are unset.
    pub fn from_inputs(min: &str, max: &str, exclude: &str) -> Result<Self, FilterError> {
        let min_app_id = parse_bound("min app id", min)?;
        let max_app_id = parse_bound("max app id", max)?;
        if let (Some(min), Some(max)) = (min_app_id, max_app_id)
            && min > max
        {
            return Err(FilterError::InvertedRange { min, max });
        }
        Ok(Self {
            min_app_id,
            max_app_id,
            exclude_terms: parse_exclude_terms(exclude),
        })
    }

    #[must_use]
    pub fn exclude_terms(&self) -> &[String] {
        &self.exclude_terms
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.min_app_id.is_some() || self.max_app_id.is_some() || !self.exclude_terms.is_empty()
    }

    #[must_use]
    pub fn matches(&self, game: &Game) -> bool {
        let id = game.appid.get();
        if self.min_app_id.is_some_and(|min| id < min) {
            return false;
        }
        if self.max_app_id.is_some_and(|max| id > max) {
            return false;
        }
        if self.exclude_terms.is_empty() {
            return true;
        }
        let name = game.name.to_lowercase();
        !self.exclude_terms.iter().any(|term| name.contains(term))
    }

    #[must_use]
    pub fn apply<'a>(&self, games: &'a [Game]) -> Vec<&'a Game> {
        games.iter().filter(|game| self.matches(game)).collect()
    }

    /// One-line description for status displays, e.g. `id 10..=500, -demo, -beta`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        match (self.min_app_id, self.max_app_id) {
            (Some(min), Some(max)) => parts.push(format!("id {min}..={max}")),
            (Some(min), None) => parts.push(format!("id >= {min}")),
            (None, Some(max)) => parts.push(format!("id <= {max}")),
            (None, None) => {}
        }
        parts.extend(self.exclude_terms.iter().map(|term| format!("-{term}")));
        parts.join(", ")
    }
}

fn parse_bound(field: &'static str, raw: &str) -> Result<Option<u32>, FilterError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u32>()
        .map(Some)
        .map_err(|_| FilterError::NotNumeric {
            field,
            value: raw.to_string(),
        })
}

fn parse_exclude_terms(raw: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in raw.split(',') {
        let term = term.trim().to_lowercase();
        if !term.is_empty() && !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}
