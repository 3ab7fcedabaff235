//! HTTP transport for the two catalog endpoints.

use std::future::Future;
use std::time::Duration;

use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use shelf_types::{AppId, GameDetails, GameDetailsResponse, GamesResponse};
use url::Url;

use crate::ApiError;
use crate::error::MAX_ERROR_BODY_BYTES;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const POOL_MAX_IDLE_PER_HOST: usize = 4;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;
const TCP_KEEPALIVE_SECS: u64 = 60;

/// Raw catalog reads. Implemented over HTTP by [`HttpCatalog`]; tests supply
/// in-memory implementations.
pub trait CatalogApi: Clone + Send + Sync + 'static {
    fn list_games(
        &self,
        page: u32,
        limit: u32,
    ) -> impl Future<Output = Result<GamesResponse, ApiError>> + Send;

    fn game_details(
        &self,
        app: AppId,
    ) -> impl Future<Output = Result<GameDetails, ApiError>> + Send;

    /// Whether an artwork URL resolves. Any failure counts as "no".
    fn artwork_exists(&self, url: &str) -> impl Future<Output = bool> + Send;
}

fn base_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .user_agent(concat!("shelf/", env!("CARGO_PKG_VERSION")))
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
}

pub fn http_client_with_timeout(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    base_client_builder().timeout(timeout).build()
}

/// Read at most [`MAX_ERROR_BODY_BYTES`] of an error response.
async fn read_capped_error_body(response: reqwest::Response) -> String {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            break;
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

/// Catalog over HTTP: `GET {base}/steam?page=&limit=` and `GET {base}/steam/{id}`.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpCatalog {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ApiError> {
        let http = http_client_with_timeout(timeout).map_err(|e| ApiError::from_reqwest(&e))?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: Url) -> Result<Self, ApiError> {
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { http, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn list_url(&self, page: u32, limit: u32) -> Result<Url, ApiError> {
        let mut url = self.endpoint(&["steam"])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());
        Ok(url)
    }

    pub(crate) fn details_url(&self, app: AppId) -> Result<Url, ApiError> {
        self.endpoint(&["steam", &app.to_string()])
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        tracing::debug!(%url, "GET");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = read_capped_error_body(response).await;
            let err = ApiError::from_status(status, &body);
            tracing::warn!(%url, %status, "catalog request failed: {err}");
            return Err(err);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(%url, "malformed catalog payload: {e}");
            ApiError::Decode(e.to_string())
        })
    }
}

impl CatalogApi for HttpCatalog {
    async fn list_games(&self, page: u32, limit: u32) -> Result<GamesResponse, ApiError> {
        let url = self.list_url(page, limit)?;
        self.get_json(url).await
    }

    async fn game_details(&self, app: AppId) -> Result<GameDetails, ApiError> {
        let url = self.details_url(app)?;
        let response: GameDetailsResponse = self.get_json(url).await?;
        Ok(response.data)
    }

    async fn artwork_exists(&self, url: &str) -> bool {
        let Ok(url) = Url::parse(url) else {
            return false;
        };
        match self.http.head(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("artwork probe failed: {e}");
                false
            }
        }
    }
}
