//! Steam store modules: HTTP client, listing, detail lookups, and wire models.

pub mod catalog;
pub mod client;
pub mod details;
pub mod error;
pub mod models;
pub mod parser;
pub mod regions;
pub mod retry;

pub use catalog::{CatalogLister, CatalogSource};
pub use client::{StoreApi, StoreClient};
pub use details::{extract_price, DetailResolver};
pub use error::FetchError;
pub use models::{AppData, CatalogEntry, PriceQuote};
pub use regions::Region;
pub use retry::{Pause, RetryPolicy};
