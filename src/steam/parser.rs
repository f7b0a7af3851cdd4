//! Decoding of store API responses.
//!
//! Every dependency on the upstream JSON shape lives here, including the
//! extraction of app ids from asset URLs.

use super::error::FetchError;
use super::models::{AppData, AppDetailsEnvelope, CatalogEntry, SearchItem, SearchPage};
use regex_lite::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

static APP_ID_IN_ASSET_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/apps/(\d+)/").unwrap());

/// Entries decoded from one search page.
#[derive(Debug, Clone, Default)]
pub struct PageEntries {
    /// Items the page contained, including skipped ones
    pub item_count: usize,
    /// Items that yielded both an id and a name
    pub entries: Vec<CatalogEntry>,
}

impl PageEntries {
    /// True when the store returned no items at all (end of catalog).
    pub fn is_exhausted(&self) -> bool {
        self.item_count == 0
    }
}

/// Pulls the app id out of an asset URL such as
/// `https://shared.akamai.steamstatic.com/store_item_assets/steam/apps/730/capsule_sm_120.jpg`.
pub fn extract_app_id(asset_url: &str) -> Option<String> {
    APP_ID_IN_ASSET_URL
        .captures(asset_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.as_u64().map(|id| id.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn entry_from_search_item(item: &SearchItem) -> Option<CatalogEntry> {
    let name = item.name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;

    let id = item
        .id
        .as_ref()
        .and_then(id_from_value)
        .or_else(|| item.logo.as_deref().and_then(extract_app_id))?;

    Some(CatalogEntry::new(id, name))
}

/// Parses a JSON page of the search endpoint.
pub fn parse_search_page(body: &str) -> Result<PageEntries, FetchError> {
    let page: SearchPage = serde_json::from_str(body)?;
    let item_count = page.items.len();

    let entries: Vec<CatalogEntry> = page
        .items
        .iter()
        .filter_map(|item| {
            let entry = entry_from_search_item(item);
            if entry.is_none() {
                debug!("Skipping search item without id or name: {:?}", item.name);
            }
            entry
        })
        .collect();

    Ok(PageEntries { item_count, entries })
}

fn entries_from_items(items: &[Value], entries: &mut Vec<CatalogEntry>) {
    for item in items {
        let id = item.get("id").and_then(id_from_value);
        let name = item
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty());

        if let (Some(id), Some(name)) = (id, name) {
            entries.push(CatalogEntry::new(id, name));
        }
    }
}

/// Parses the featured-categories response.
///
/// Every object value with an `items` array is a category; values of any
/// other shape (such as the numeric `status`) are ignored.
pub fn parse_featured(body: &str) -> Result<Vec<CatalogEntry>, FetchError> {
    let root: Value = serde_json::from_str(body)?;
    let Some(categories) = root.as_object() else {
        return Err(FetchError::Decode("featured categories is not an object".to_string()));
    };

    let mut entries = Vec::new();

    for (key, category) in categories {
        let Some(items) = category.get("items").and_then(Value::as_array) else {
            continue;
        };
        debug!("Category {} has {} items", key, items.len());
        entries_from_items(items, &mut entries);
    }

    Ok(entries)
}

/// Parses the single top-sellers category. A missing `items` array is an
/// empty category.
pub fn parse_top_sellers(body: &str) -> Result<Vec<CatalogEntry>, FetchError> {
    let root: Value = serde_json::from_str(body)?;
    if !root.is_object() {
        return Err(FetchError::Decode("top sellers is not an object".to_string()));
    }

    let mut entries = Vec::new();
    if let Some(items) = root.get("items").and_then(Value::as_array) {
        entries_from_items(items, &mut entries);
    }

    Ok(entries)
}

/// Parses the details endpoint response for `app_id`.
///
/// Returns `Ok(None)` when the store reports `success: false`, omits the id,
/// or answers with a bare `null`.
pub fn parse_app_details(body: &str, app_id: &str) -> Result<Option<AppData>, FetchError> {
    let by_id: Option<HashMap<String, AppDetailsEnvelope>> = serde_json::from_str(body)?;

    let Some(envelope) = by_id.and_then(|mut map| map.remove(app_id)) else {
        debug!("No details entry for app {}", app_id);
        return Ok(None);
    };

    if !envelope.success {
        return Ok(None);
    }

    Ok(envelope.data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_app_id_from_logo() {
        let url = "https://shared.akamai.steamstatic.com/store_item_assets/steam/apps/730/capsule_sm_120.jpg?t=1729703045";
        assert_eq!(extract_app_id(url), Some("730".to_string()));

        let cdn = "https://cdn.cloudflare.steamstatic.com/steam/apps/1091500/capsule_sm_120.jpg";
        assert_eq!(extract_app_id(cdn), Some("1091500".to_string()));
    }

    #[test]
    fn test_extract_app_id_rejects_other_assets() {
        assert_eq!(
            extract_app_id("https://cdn.steamstatic.com/steam/bundles/232/capsule.jpg"),
            None
        );
        assert_eq!(extract_app_id("https://cdn.steamstatic.com/steam/apps/abc/x.jpg"), None);
        assert_eq!(extract_app_id(""), None);
    }

    #[test]
    fn test_parse_search_page() {
        let body = r#"{
            "desc": "",
            "items": [
                {"name": "Counter-Strike 2", "logo": "https://cdn.steamstatic.com/steam/apps/730/capsule_sm_120.jpg"},
                {"name": "Cyberpunk 2077", "logo": "https://cdn.steamstatic.com/steam/apps/1091500/capsule_sm_120.jpg"},
                {"name": "Some Bundle", "logo": "https://cdn.steamstatic.com/steam/bundles/232/capsule.jpg"},
                {"logo": "https://cdn.steamstatic.com/steam/apps/440/capsule_sm_120.jpg"},
                {"name": "  ", "logo": "https://cdn.steamstatic.com/steam/apps/570/capsule_sm_120.jpg"}
            ]
        }"#;

        let page = parse_search_page(body).unwrap();
        assert_eq!(page.item_count, 5);
        assert!(!page.is_exhausted());
        assert_eq!(
            page.entries,
            vec![
                CatalogEntry::new("730", "Counter-Strike 2"),
                CatalogEntry::new("1091500", "Cyberpunk 2077"),
            ]
        );
    }

    #[test]
    fn test_parse_search_page_prefers_explicit_id() {
        let body = r#"{"items": [{"id": 620, "name": "Portal 2", "logo": "https://x/steam/apps/999/a.jpg"}]}"#;
        let page = parse_search_page(body).unwrap();
        assert_eq!(page.entries, vec![CatalogEntry::new("620", "Portal 2")]);
    }

    #[test]
    fn test_parse_search_page_empty() {
        let page = parse_search_page(r#"{"desc": "", "items": []}"#).unwrap();
        assert!(page.is_exhausted());
        assert!(page.entries.is_empty());
    }

    #[test]
    fn test_parse_search_page_invalid_json() {
        let result = parse_search_page("<html>Access Denied</html>");
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_parse_featured() {
        let body = r#"{
            "0": {"id": "cat_spotlight", "name": "Spotlights", "items": [{"name": "Spotlight without id"}]},
            "specials": {"id": "cat_specials", "name": "Specials", "items": [
                {"id": 1245620, "name": "ELDEN RING"},
                {"id": 292030, "name": "The Witcher 3: Wild Hunt"}
            ]},
            "top_sellers": {"id": "cat_topsellers", "name": "Top Sellers", "items": [
                {"id": 1245620, "name": "ELDEN RING"}
            ]},
            "status": 1
        }"#;

        let entries = parse_featured(body).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.contains(&CatalogEntry::new("292030", "The Witcher 3: Wild Hunt")));
    }

    #[test]
    fn test_parse_top_sellers() {
        let body = r#"{"id": "cat_topsellers", "name": "Top Sellers", "items": [
            {"id": 730, "name": "Counter-Strike 2"},
            {"id": 1086940, "name": "Baldur's Gate 3"},
            {"name": "No id"}
        ]}"#;

        let entries = parse_top_sellers(body).unwrap();
        assert_eq!(
            entries,
            vec![
                CatalogEntry::new("730", "Counter-Strike 2"),
                CatalogEntry::new("1086940", "Baldur's Gate 3"),
            ]
        );

        assert!(parse_top_sellers(r#"{"status": 1}"#).unwrap().is_empty());
        assert!(matches!(parse_top_sellers("[]"), Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_parse_featured_not_object() {
        assert!(matches!(parse_featured("[1, 2]"), Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_parse_app_details_success() {
        let body = r#"{"730": {"success": true, "data": {
            "type": "game",
            "name": "Counter-Strike 2",
            "is_free": false,
            "price_overview": {"currency": "UAH", "initial": 1000, "final": 1000, "discount_percent": 0}
        }}}"#;

        let data = parse_app_details(body, "730").unwrap().unwrap();
        assert_eq!(data.name, "Counter-Strike 2");
        assert_eq!(data.price_overview.unwrap().final_price, 1000);
    }

    #[test]
    fn test_parse_app_details_unsuccessful() {
        let body = r#"{"12345": {"success": false}}"#;
        assert_eq!(parse_app_details(body, "12345").unwrap(), None);
    }

    #[test]
    fn test_parse_app_details_other_id_or_null() {
        let body = r#"{"1": {"success": true, "data": {"name": "Other"}}}"#;
        assert_eq!(parse_app_details(body, "2").unwrap(), None);
        assert_eq!(parse_app_details("null", "2").unwrap(), None);
    }

    #[test]
    fn test_parse_app_details_free_game() {
        let body = r#"{"570": {"success": true, "data": {"name": "Dota 2", "is_free": true}}}"#;
        let data = parse_app_details(body, "570").unwrap().unwrap();
        assert!(data.is_free);
        assert!(data.price_overview.is_none());
    }

    #[test]
    fn test_parse_app_details_garbage() {
        assert!(matches!(parse_app_details("not json", "1"), Err(FetchError::Decode(_))));
    }
}
