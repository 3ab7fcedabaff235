//! Configuration loading for Shelf.
//!
//! The config file lives at `~/.shelf/config.toml`. Every section and key is
//! optional; [`Settings::resolve`] fills in defaults and applies environment
//! overrides so the rest of the application never handles `Option`s.
//!
//! ```toml
//! [app]
//! tui = "full"
//! ascii_only = false
//! high_contrast = false
//!
//! [api]
//! base_url = "${SHELF_BACKEND}/api/v1"
//! timeout_seconds = 15
//! page_size = 24
//!
//! [search]
//! debounce_ms = 500
//! max_scan_pages = 10
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:1200/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_PAGE_SIZE: u32 = 24;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_MAX_SCAN_PAGES: u32 = 10;

/// Environment variable overriding `[api] base_url`.
pub const BASE_URL_ENV: &str = "SHELF_API_URL";

#[derive(Debug, Default, Deserialize)]
pub struct ShelfConfig {
    pub app: Option<AppConfig>,
    pub api: Option<ApiConfig>,
    pub search: Option<SearchConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid api base url `{value}`: {source}")]
    InvalidBaseUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("api base url `{0}` must use http or https")]
    UnsupportedScheme(String),
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            ConfigError::InvalidBaseUrl { .. } | ConfigError::UnsupportedScheme(_) => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// "full" (alternate screen) or "inline".
    pub tui: Option<String>,
    /// Use ASCII-only glyphs for icons and markers.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
}

/// Catalog backend settings.
#[derive(Debug, Default, Deserialize)]
pub struct ApiConfig {
    /// Base URL including the API prefix. Supports `${VAR}` expansion.
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    /// Items per list page. Clamped to `1..=100`.
    pub page_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a search is dispatched.
    pub debounce_ms: Option<u64>,
    /// How many list pages a name search scans.
    pub max_scan_pages: Option<u32>,
}

/// Expand `${VAR}` references. Unset variables expand to the empty string;
/// an unclosed `${` is kept literally.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                if !var.is_empty() {
                    out.push_str(&env::var(var).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

impl ShelfConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Load from an explicit path. A missing file is `Ok(None)`.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

/// Terminal presentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuiMode {
    Full,
    Inline,
}

impl TuiMode {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "inline" => Some(TuiMode::Inline),
            "full" | "fullscreen" => Some(TuiMode::Full),
            _ => None,
        }
    }
}

/// Fully resolved settings with defaults applied.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: Url,
    pub request_timeout: Duration,
    pub page_size: u32,
    pub debounce: Duration,
    pub max_scan_pages: u32,
    pub ascii_only: bool,
    pub high_contrast: bool,
    pub tui: Option<TuiMode>,
}

impl Settings {
    /// Defaults with no config file and no environment overrides.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::resolve_with_env(None, |_| None)
    }

    /// Resolve against the process environment.
    pub fn resolve(config: Option<&ShelfConfig>) -> Result<Self, ConfigError> {
        Self::resolve_with_env(config, |name| env::var(name).ok())
    }

    /// Resolve with an injectable environment lookup.
    pub fn resolve_with_env(
        config: Option<&ShelfConfig>,
        env_lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let app = config.and_then(|c| c.app.as_ref());
        let api = config.and_then(|c| c.api.as_ref());
        let search = config.and_then(|c| c.search.as_ref());

        let raw_base = env_lookup(BASE_URL_ENV)
            .filter(|value| !value.trim().is_empty())
            .or_else(|| api.and_then(|a| a.base_url.as_deref()).map(expand_env_vars))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url(raw_base.trim())?;

        let page_size = api
            .and_then(|a| a.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let clamped_page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        if clamped_page_size != page_size {
            tracing::warn!(
                requested = page_size,
                using = clamped_page_size,
                "page_size out of range"
            );
        }

        let tui = app.and_then(|a| a.tui.as_deref()).and_then(|raw| {
            let mode = TuiMode::parse(raw);
            if mode.is_none() {
                tracing::warn!("Unknown tui mode in config: {}", raw);
            }
            mode
        });

        Ok(Self {
            base_url,
            request_timeout: Duration::from_secs(
                api.and_then(|a| a.timeout_seconds)
                    .filter(|secs| *secs > 0)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            page_size: clamped_page_size,
            debounce: Duration::from_millis(
                search
                    .and_then(|s| s.debounce_ms)
                    .unwrap_or(DEFAULT_DEBOUNCE_MS),
            ),
            max_scan_pages: search
                .and_then(|s| s.max_scan_pages)
                .unwrap_or(DEFAULT_MAX_SCAN_PAGES)
                .max(1),
            ascii_only: app.is_some_and(|a| a.ascii_only),
            high_contrast: app.is_some_and(|a| a.high_contrast),
            tui,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|source| ConfigError::InvalidBaseUrl {
        value: raw.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::UnsupportedScheme(raw.to_string()));
    }
    Ok(url)
}

/// `~/.shelf`, home of the config file, logs, and search history.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".shelf"))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("config.toml"))
}

#[must_use]
pub fn history_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("search_history.json"))
}
