//! Product catalog lookup
//!
//! Resolves extracted receipt lines against the product catalog. Items
//! resolve concurrently and independently: one item's failed lookup degrades
//! to a placeholder record instead of failing the batch, and the output
//! order always matches the input order.

use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::future::join_all;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::CatalogSettings;

/// Catalog metadata (or fallback placeholder) resolved for one line item
#[derive(Debug, Clone)]
pub struct ProductRecord {
    /// The line item the lookup was made for
    pub query_item: String,
    /// Display name; falls back to the query item when unresolved
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    /// Energy per 100 g as reported by the catalog
    pub energy_per_100g: Option<f64>,
    pub barcode: Option<String>,
    /// Whether the catalog produced a real match
    pub resolved: bool,
}

impl ProductRecord {
    /// Placeholder for an item the catalog could not resolve; the item is
    /// never silently dropped from the batch.
    fn unresolved(item: &str) -> Self {
        Self {
            query_item: item.to_string(),
            name: item.to_string(),
            brand: None,
            category: None,
            energy_per_100g: None,
            barcode: None,
            resolved: false,
        }
    }

    fn from_product(item: &str, product: CatalogProduct) -> Self {
        let name = product
            .product_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| item.to_string());

        Self {
            query_item: item.to_string(),
            name,
            brand: product.brands,
            category: product.categories,
            energy_per_100g: product.nutriments.and_then(|n| n.energy_100g),
            barcode: product.code,
            resolved: true,
        }
    }
}

/// Lookup-by-code response envelope
#[derive(Debug, Deserialize)]
struct BarcodeResponse {
    #[serde(default)]
    status: u8,
    product: Option<CatalogProduct>,
}

/// Free-text search response envelope
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<CatalogProduct>,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogProduct {
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    brands: Option<String>,
    #[serde(default)]
    categories: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    nutriments: Option<Nutriments>,
}

#[derive(Debug, Clone, Deserialize)]
struct Nutriments {
    #[serde(rename = "energy_100g", default)]
    energy_100g: Option<f64>,
}

/// Whether an item looks like a bare EAN/UPC barcode (8-13 digits)
fn is_barcode(item: &str) -> bool {
    (8..=13).contains(&item.len()) && item.chars().all(|c| c.is_ascii_digit())
}

/// Client for the product catalog service
pub struct CatalogClient {
    http: reqwest::Client,
    settings: CatalogSettings,
}

impl CatalogClient {
    pub fn new(settings: CatalogSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { http, settings })
    }

    /// Resolve a batch of items concurrently, preserving input order.
    pub async fn resolve_items(&self, items: &[String]) -> Vec<ProductRecord> {
        let lookups = items.iter().map(|item| self.resolve_item(item));
        join_all(lookups).await
    }

    /// Resolve one item. Never fails; lookup errors degrade to an
    /// unresolved placeholder record.
    pub async fn resolve_item(&self, item: &str) -> ProductRecord {
        match self.try_resolve(item).await {
            Ok(Some(product)) => ProductRecord::from_product(item, product),
            Ok(None) => {
                debug!(item, "no catalog match");
                ProductRecord::unresolved(item)
            }
            Err(e) => {
                warn!(item, "catalog lookup failed: {e:#}");
                ProductRecord::unresolved(item)
            }
        }
    }

    async fn try_resolve(&self, item: &str) -> Result<Option<CatalogProduct>> {
        if is_barcode(item) {
            if let Some(product) = self.lookup_barcode(item).await? {
                return Ok(Some(product));
            }
            // Known-code miss falls through to text search
        }
        self.search(item).await
    }

    /// Exact lookup by barcode; `Ok(None)` when the catalog has no such code
    async fn lookup_barcode(&self, code: &str) -> Result<Option<CatalogProduct>> {
        let url = format!(
            "{}/api/v0/product/{}.json",
            self.settings.base_url.trim_end_matches('/'),
            code
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("barcode lookup request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("barcode lookup returned status {}", response.status());
        }

        let envelope: BarcodeResponse = response
            .json()
            .await
            .context("malformed barcode lookup response")?;

        if envelope.status == 1 {
            Ok(envelope.product)
        } else {
            Ok(None)
        }
    }

    /// Free-text search; returns the first hit
    async fn search(&self, query: &str) -> Result<Option<CatalogProduct>> {
        let url = format!(
            "{}/cgi/search.pl",
            self.settings.base_url.trim_end_matches('/')
        );

        let response = self
            .http
            .get(&url)
            .query(&[
                ("search_terms", query),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
            ])
            .send()
            .await
            .context("catalog search request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("catalog search returned status {}", response.status());
        }

        let envelope: SearchResponse = response
            .json()
            .await
            .context("malformed catalog search response")?;

        Ok(envelope.products.into_iter().next())
    }
}
