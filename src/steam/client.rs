//! HTTP client for the Steam store API using wreq for browser emulation.

use super::error::FetchError;
use super::regions::Region;
use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Public storefront host.
pub const STORE_BASE_URL: &str = "https://store.steampowered.com";

/// Store endpoints - a trait so the lister and resolver can run against mocks.
///
/// Implementations issue exactly one request per call and never retry.
#[async_trait]
pub trait StoreApi: Send + Sync {
    /// Fetches one JSON page of the search endpoint.
    async fn search_page(&self, start: u32, count: u32, region: Region)
        -> Result<String, FetchError>;

    /// Fetches the featured-categories listing.
    async fn featured(&self, region: Region) -> Result<String, FetchError>;

    /// Fetches the standalone top-sellers category.
    async fn top_sellers(&self, region: Region) -> Result<String, FetchError>;

    /// Fetches the details payload of one app in one region.
    async fn app_details(&self, app_id: &str, region: Region) -> Result<String, FetchError>;
}

/// Steam store client sending browser-like requests.
pub struct StoreClient {
    client: Client,
    base_url: String,
}

impl StoreClient {
    /// Creates a client for the public store.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config, None)
    }

    /// Creates a client with an optional custom base URL (for testing).
    ///
    /// A malformed base URL or proxy is a configuration error and fails here.
    pub fn with_base_url(config: &Config, base_url: Option<String>) -> Result<Self> {
        let base_url = base_url.unwrap_or_else(|| STORE_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            anyhow::bail!("Invalid store base URL: '{}'", base_url);
        }

        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds `base + path + ?query` with percent-encoded values.
    fn url(&self, path: &str, params: &[(&str, String)]) -> String {
        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        if query.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}?{}", self.base_url, path, query)
        }
    }

    /// Performs one GET and maps the status code onto [`FetchError`].
    pub async fn fetch(&self, path: &str, params: &[(&str, String)]) -> Result<String, FetchError> {
        let url = self.url(path, params);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "application/json, text/javascript, */*; q=0.01")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("Cache-Control", "no-cache")
            .header("Referer", format!("{}/", self.base_url))
            .header("Sec-Fetch-Dest", "empty")
            .header("Sec-Fetch-Mode", "cors")
            .header("Sec-Fetch-Site", "same-origin")
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 429 {
            warn!("Rate limited (429) on {}", path);
            return Err(FetchError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::http(status.as_u16(), &body));
        }

        response.text().await.map_err(|e| FetchError::Transport(e.to_string()))
    }
}

#[async_trait]
impl StoreApi for StoreClient {
    async fn search_page(
        &self,
        start: u32,
        count: u32,
        region: Region,
    ) -> Result<String, FetchError> {
        let params = [
            ("query", String::new()),
            ("start", start.to_string()),
            ("count", count.to_string()),
            ("cc", region.country_code().to_string()),
            ("l", "english".to_string()),
            ("category1", "998".to_string()),
            ("json", "1".to_string()),
        ];
        self.fetch("/search/results/", &params).await
    }

    async fn featured(&self, region: Region) -> Result<String, FetchError> {
        let params =
            [("cc", region.country_code().to_string()), ("l", "english".to_string())];
        self.fetch("/api/featuredcategories", &params).await
    }

    async fn top_sellers(&self, region: Region) -> Result<String, FetchError> {
        let params =
            [("cc", region.country_code().to_string()), ("l", "english".to_string())];
        self.fetch("/api/featuredcategories/TopSellers", &params).await
    }

    async fn app_details(&self, app_id: &str, region: Region) -> Result<String, FetchError> {
        let params = [("appids", app_id.to_string()), ("cc", region.country_code().to_string())];
        self.fetch("/api/appdetails", &params).await
    }
}
