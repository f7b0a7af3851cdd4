//! Catalog listing: paginates the store and collects unique entries.

use super::client::StoreApi;
use super::models::{dedup_entries, CatalogEntry};
use super::parser;
use super::regions::Region;
use super::retry::{Pause, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Items requested per search page.
pub const PAGE_SIZE: u32 = 50;

/// Where the catalog comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    /// Paginated search endpoint
    #[default]
    Search,
    /// Featured categories (specials, top sellers, ...), single request
    Featured,
}

impl FromStr for CatalogSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "search" => Ok(CatalogSource::Search),
            "featured" => Ok(CatalogSource::Featured),
            _ => Err(format!("Unknown catalog source: {}. Use: search, featured", s)),
        }
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::Search => write!(f, "search"),
            CatalogSource::Featured => write!(f, "featured"),
        }
    }
}

/// Lists catalog entries from the store.
pub struct CatalogLister<'a, C: StoreApi + ?Sized> {
    client: &'a C,
    region: Region,
    source: CatalogSource,
    retry: RetryPolicy,
    page_pause: Pause,
}

impl<'a, C: StoreApi + ?Sized> CatalogLister<'a, C> {
    pub fn new(client: &'a C, region: Region, retry: RetryPolicy, page_pause: Pause) -> Self {
        Self { client, region, source: CatalogSource::Search, retry, page_pause }
    }

    pub fn with_source(mut self, source: CatalogSource) -> Self {
        self.source = source;
        self
    }

    /// Lists up to `max_pages` pages. Never fails: a page that cannot be
    /// fetched ends listing with whatever was collected so far.
    pub async fn list_entries(&self, max_pages: u32) -> Vec<CatalogEntry> {
        let collected = match self.source {
            CatalogSource::Search => self.list_search(max_pages).await,
            CatalogSource::Featured => self.list_featured().await,
        };

        let unique = dedup_entries(collected);
        info!("Catalog listing finished with {} unique entries", unique.len());
        unique
    }

    async fn list_search(&self, max_pages: u32) -> Vec<CatalogEntry> {
        let mut collected: Vec<CatalogEntry> = Vec::new();

        for page in 0..max_pages {
            if page > 0 {
                self.page_pause.wait().await;
            }

            let start = page * PAGE_SIZE;
            let what = format!("search page {}", page + 1);
            debug!("Fetching {} (start={})", what, start);

            let body = match self
                .retry
                .run(&what, || self.client.search_page(start, PAGE_SIZE, self.region))
                .await
            {
                Ok(body) => body,
                Err(e) => {
                    warn!("Abandoning {} after retries: {}. Stopping listing.", what, e);
                    break;
                }
            };

            let parsed = match parser::parse_search_page(&body) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Could not read {}: {}. Stopping listing.", what, e);
                    break;
                }
            };

            if parsed.is_exhausted() {
                debug!("No items on {}, end of catalog", what);
                break;
            }

            info!(
                "Page {}/{}: {} items, {} usable",
                page + 1,
                max_pages,
                parsed.item_count,
                parsed.entries.len()
            );
            collected.extend(parsed.entries);
        }

        collected
    }

    async fn list_featured(&self) -> Vec<CatalogEntry> {
        let body = match self
            .retry
            .run("featured categories", || self.client.featured(self.region))
            .await
        {
            Ok(body) => body,
            Err(e) => {
                warn!("Abandoning featured categories after retries: {}", e);
                return Vec::new();
            }
        };

        let mut entries = match parser::parse_featured(&body) {
            Ok(entries) => {
                info!("Featured categories: {} entries", entries.len());
                entries
            }
            Err(e) => {
                warn!("Could not read featured categories: {}", e);
                return Vec::new();
            }
        };

        // Top sellers are a separate request; losing them keeps the featured entries.
        let top_sellers = self
            .retry
            .run("top sellers", || self.client.top_sellers(self.region))
            .await
            .and_then(|body| parser::parse_top_sellers(&body));

        match top_sellers {
            Ok(sellers) => {
                info!("Top sellers: {} entries", sellers.len());
                entries.extend(sellers);
            }
            Err(e) => warn!("Skipping top sellers: {}", e),
        }

        entries
    }
}
