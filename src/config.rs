use crate::models::{Catalog, CatalogItem};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const BASE_URL_ENV: &str = "RECEIPT_SERVICE_URL";

pub const PROCESS_PATH: &str = "receipts/process";

/// Items offered on the page, in display order, with their unit prices.
pub fn catalog_items() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Mountain Dew 12 PK", "6.49"),
        ("Emils Cheese Pizza", "12.25"),
        ("Knorr Creamy Chicken", "1.26"),
        ("Doritos Nacho Cheese", "3.35"),
        ("Klarbrunn 12-PK 12 FL OZ", "12.00"),
        ("Gatorade", "2.25"),
        ("Pepsi - 12-oz", "1.25"),
        ("Dasani", "1.40"),
    ]
}

pub fn default_stores() -> Vec<String> {
    ["M&M Corner Market", "Target", "Walgreens", "Walmart"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// The built-in catalog. Its prices are constants, so failing to parse one is a
/// programming error caught by the test suite; an empty catalog is returned
/// instead of panicking.
pub fn default_catalog() -> Catalog {
    let items: crate::Result<Vec<CatalogItem>> = catalog_items()
        .into_iter()
        .map(|(name, price)| CatalogItem::new(name, price))
        .collect();
    match items.and_then(Catalog::new) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!(error = %e, "built-in catalog is invalid");
            Catalog::empty()
        }
    }
}

/// Base URL of the scoring service: `RECEIPT_SERVICE_URL` if set and non-empty,
/// otherwise [`DEFAULT_BASE_URL`].
pub fn base_url_from_env() -> String {
    match std::env::var(BASE_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => url.trim().to_string(),
        _ => DEFAULT_BASE_URL.to_string(),
    }
}
