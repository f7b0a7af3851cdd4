//! Data models for catalog entries, prices, and store API payloads.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One catalog product. Identity is the `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Steam app id, kept opaque
    pub id: String,
    /// Display name
    pub name: String,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

/// Deduplicates entries by id.
///
/// Each id keeps the position where it was first seen and the name from its
/// last occurrence.
pub fn dedup_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Vec<CatalogEntry> {
    let mut unique: Vec<CatalogEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        match index.get(&entry.id) {
            Some(&pos) => unique[pos] = entry,
            None => {
                index.insert(entry.id.clone(), unique.len());
                unique.push(entry);
            }
        }
    }

    unique
}

/// A priced offer for one entry in one region, in major currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Currency code (UAH, IDR)
    pub currency: String,
    /// Price before discount
    pub initial: f64,
    /// Price actually charged
    #[serde(rename = "final")]
    pub final_price: f64,
    /// Discount applied, 0-100
    pub discount_percent: u32,
}

impl From<&PriceOverview> for PriceQuote {
    fn from(overview: &PriceOverview) -> Self {
        Self {
            currency: overview.currency.clone(),
            initial: overview.initial as f64 / 100.0,
            final_price: overview.final_price as f64 / 100.0,
            discount_percent: overview.discount_percent,
        }
    }
}

// Wire types for the store API. Field names follow the upstream JSON.

/// `{"<appid>": {"success": bool, "data": {...}}}` value of the details endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AppDetailsEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<AppData>,
}

/// Per-region detail payload of one app.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub price_overview: Option<PriceOverview>,
}

/// Price block of the details payload, amounts in minor units.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceOverview {
    pub currency: String,
    #[serde(default)]
    pub initial: u64,
    #[serde(rename = "final", default)]
    pub final_price: u64,
    #[serde(default)]
    pub discount_percent: u32,
}

/// JSON page of the search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

/// One search hit. The id is usually only present inside `logo`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_unique_ids() {
        let entries = vec![
            CatalogEntry::new("10", "Counter-Strike"),
            CatalogEntry::new("20", "Team Fortress Classic"),
            CatalogEntry::new("10", "Counter-Strike"),
            CatalogEntry::new("30", "Day of Defeat"),
        ];

        let unique = dedup_entries(entries);
        let ids: Vec<&str> = unique.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["10", "20", "30"]);
    }

    #[test]
    fn test_dedup_last_name_wins() {
        let entries =
            vec![CatalogEntry::new("570", "Dota"), CatalogEntry::new("570", "Dota 2")];

        let unique = dedup_entries(entries);
        assert_eq!(unique, vec![CatalogEntry::new("570", "Dota 2")]);
    }

    #[test]
    fn test_dedup_empty() {
        assert!(dedup_entries(Vec::new()).is_empty());
    }

    #[test]
    fn test_quote_from_overview_divides_minor_units() {
        let overview = PriceOverview {
            currency: "IDR".to_string(),
            initial: 30000000,
            final_price: 15000000,
            discount_percent: 50,
        };

        let quote = PriceQuote::from(&overview);
        assert_eq!(quote.currency, "IDR");
        assert_eq!(quote.initial, 300000.0);
        assert_eq!(quote.final_price, 150000.0);
        assert_eq!(quote.discount_percent, 50);
    }

    #[test]
    fn test_price_overview_deserialize() {
        let json = r#"{
            "currency": "UAH",
            "initial": 39900,
            "final": 19950,
            "discount_percent": 50,
            "initial_formatted": "399₴",
            "final_formatted": "199,50₴"
        }"#;

        let overview: PriceOverview = serde_json::from_str(json).unwrap();
        assert_eq!(overview.final_price, 19950);
        assert_eq!(overview.initial, 39900);
    }

    #[test]
    fn test_envelope_without_data() {
        let envelope: AppDetailsEnvelope = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_quote_serializes_final_field() {
        let quote = PriceQuote {
            currency: "UAH".to_string(),
            initial: 10.0,
            final_price: 10.0,
            discount_percent: 0,
        };
        let json = serde_json::to_string(&quote).unwrap();
        assert!(json.contains("\"final\":10.0"));
    }
}
