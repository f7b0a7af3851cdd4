//! steam-price-gap - Compare Steam store prices between regions
//!
//! Lists the store catalog, fetches each game's price in Ukraine and
//! Indonesia, converts UAH to IDR and ranks games by the savings.

pub mod commands;
pub mod config;
pub mod format;
pub mod pricing;
pub mod steam;

pub use config::Config;
pub use pricing::{ComparisonRecord, ExchangeRate};
pub use steam::{CatalogEntry, PriceQuote, Region};
