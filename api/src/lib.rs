//! Catalog backend access for Shelf.
//!
//! - [`HttpCatalog`]: reqwest transport for the list and detail endpoints
//! - [`Catalog`]: keyed caches with in-flight sharing, plus client-side search
//! - [`ApiError`]: cloneable failure taxonomy shown in the error panel

mod cache;
mod catalog;
mod client;
mod error;

pub use cache::QueryCache;
pub use catalog::{Catalog, ListKey, SearchResults};
pub use client::{CatalogApi, HttpCatalog, http_client_with_timeout};
pub use error::ApiError;
