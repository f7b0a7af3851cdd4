//! Catalog listing command implementation.

use crate::config::Config;
use crate::format::Formatter;
use crate::pricing::SOURCE_REGION;
use crate::steam::{CatalogLister, StoreApi, StoreClient};
use anyhow::{Context, Result};
use tracing::info;

/// Lists the catalog without fetching prices.
pub struct ListCommand {
    config: Config,
}

impl ListCommand {
    /// Creates a new list command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Lists `max_pages` pages and returns formatted output.
    pub async fn execute(&self, max_pages: u32) -> Result<String> {
        let client = StoreClient::new(&self.config).context("Failed to create HTTP client")?;
        self.execute_with_client(&client, max_pages).await
    }

    /// Lists the catalog with a provided client (for testing).
    pub async fn execute_with_client(
        &self,
        client: &impl StoreApi,
        max_pages: u32,
    ) -> Result<String> {
        info!("Listing {} catalog ({} pages max)", self.config.source, max_pages);

        let entries = CatalogLister::new(
            client,
            SOURCE_REGION,
            self.config.page_retry(),
            self.config.page_pause(),
        )
        .with_source(self.config.source)
        .list_entries(max_pages)
        .await;

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_entries(&entries))
    }
}
