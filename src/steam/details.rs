//! Per-app, per-region detail lookups and price extraction.

use super::client::StoreApi;
use super::error::FetchError;
use super::models::{AppData, PriceQuote};
use super::parser;
use super::regions::Region;
use super::retry::{Pause, RetryPolicy};
use std::sync::Arc;
use tracing::debug;

/// Resolves app details through the store client.
///
/// Cheap to clone; worker tasks each hold their own copy.
pub struct DetailResolver<C: StoreApi + ?Sized> {
    client: Arc<C>,
    retry: RetryPolicy,
    success_pause: Pause,
}

impl<C: StoreApi + ?Sized> Clone for DetailResolver<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            retry: self.retry,
            success_pause: self.success_pause,
        }
    }
}

impl<C: StoreApi + ?Sized> DetailResolver<C> {
    pub fn new(client: Arc<C>, retry: RetryPolicy, success_pause: Pause) -> Self {
        Self { client, retry, success_pause }
    }

    /// Fetches the details of `app_id` in `region`.
    ///
    /// `Ok(None)` means the store does not sell the app there (or it does not
    /// exist) and is final. `Err` means the lookup was abandoned after the
    /// retry budget ran out, or the response could not be decoded.
    ///
    /// A confirmed success is followed by the configured pause, whatever the
    /// number of concurrent workers.
    pub async fn get_details(
        &self,
        app_id: &str,
        region: Region,
    ) -> Result<Option<AppData>, FetchError> {
        let what = format!("details for app {} ({})", app_id, region);

        let body = self.retry.run(&what, || self.client.app_details(app_id, region)).await?;
        let details = parser::parse_app_details(&body, app_id)?;

        match &details {
            Some(data) => {
                debug!("Got {} for '{}'", what, data.name);
                self.success_pause.wait().await;
            }
            None => debug!("App {} unavailable in region {}", app_id, region),
        }

        Ok(details)
    }
}

/// Reads the price block of a details payload.
///
/// Free, unreleased and region-locked apps have no price block and yield
/// `None`, never a zero-priced quote.
pub fn extract_price(data: &AppData) -> Option<PriceQuote> {
    data.price_overview.as_ref().map(PriceQuote::from)
}
