//! CDN artwork URLs and the fallback chain walked when one is missing.

use crate::{AppId, GameDetails};

const CDN: &str = "https://cdn.akamai.steamstatic.com";
const LEGACY_CDN: &str = "https://steamcdn-a.akamaihd.net";
const COMMUNITY_MEDIA: &str = "https://media.steampowered.com";

#[must_use]
pub fn header_url(app: AppId) -> String {
    format!("{CDN}/steam/apps/{app}/header.jpg")
}

#[must_use]
pub fn alternative_url(app: AppId) -> String {
    format!("{LEGACY_CDN}/steam/apps/{app}/capsule_616x353.jpg")
}

#[must_use]
pub fn capsule_url(app: AppId) -> String {
    format!("{CDN}/steam/apps/{app}/capsule_231x87.jpg")
}

#[must_use]
pub fn library_url(app: AppId) -> String {
    format!("{CDN}/steam/apps/{app}/library_600x900.jpg")
}

/// Icon URL; `icon_hash` is the `img_icon_url` field of a list entry.
#[must_use]
pub fn icon_url(app: AppId, icon_hash: Option<&str>) -> String {
    match icon_hash.map(str::trim).filter(|hash| !hash.is_empty()) {
        Some(hash) => {
            format!("{COMMUNITY_MEDIA}/steamcommunity/public/images/apps/{app}/{hash}.jpg")
        }
        None => format!("{CDN}/steamcommunity/public/images/apps/{app}/icon.jpg"),
    }
}

/// Ordered artwork candidates for one item.
///
/// `current` is the candidate to try; `advance` is called when it fails to
/// load. Once every candidate has failed the chain is exhausted and the
/// caller shows a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkChain {
    candidates: Vec<String>,
    index: usize,
}

impl ArtworkChain {
    #[must_use]
    pub fn for_app(app: AppId) -> Self {
        Self::from_candidates([
            header_url(app),
            alternative_url(app),
            capsule_url(app),
            library_url(app),
        ])
    }

    /// Like [`ArtworkChain::for_app`], but tries the record's own header image first.
    #[must_use]
    pub fn for_details(details: &GameDetails) -> Self {
        let own = details.header_image.trim();
        let mut chain = Self::for_app(details.steam_appid);
        if !own.is_empty() && !chain.candidates.iter().any(|c| c == own) {
            chain.candidates.insert(0, own.to_string());
        }
        chain
    }

    #[must_use]
    pub fn from_candidates(candidates: impl IntoIterator<Item = String>) -> Self {
        Self {
            candidates: candidates.into_iter().collect(),
            index: 0,
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.candidates.get(self.index).map(String::as_str)
    }

    /// Mark the current candidate as failed and return the next one.
    pub fn advance(&mut self) -> Option<&str> {
        if self.index < self.candidates.len() {
            self.index += 1;
        }
        self.current()
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.index >= self.candidates.len()
    }

    #[must_use]
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }
}
