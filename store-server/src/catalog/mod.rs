//! Product catalog collaborator
//!
//! The engine never trusts the catalog blindly: lookups happen before a
//! transaction starts, and everything that affects invariants (price
//! bounds, availability) is re-checked by the order action.

use async_trait::async_trait;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::CatalogProduct;
use std::collections::HashMap;

/// Read-only product lookup
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// `Ok(None)` means the product does not exist; errors mean the
    /// catalog itself could not answer.
    async fn fetch_product(&self, product_id: &str) -> AppResult<Option<CatalogProduct>>;
}

/// Remote catalog over HTTP
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ProductCatalog for HttpCatalog {
    async fn fetch_product(&self, product_id: &str) -> AppResult<Option<CatalogProduct>> {
        let url = format!("{}/products/{}", self.base_url, product_id);
        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!(error = %e, url = %url, "catalog request failed");
            AppError::with_message(ErrorCode::CatalogUnavailable, e.to_string())
        })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AppError::with_message(
                ErrorCode::CatalogUnavailable,
                format!("catalog returned {}", response.status()),
            ));
        }

        let product = response.json::<CatalogProduct>().await.map_err(|e| {
            AppError::with_message(ErrorCode::CatalogUnavailable, e.to_string())
        })?;
        Ok(Some(product))
    }
}

/// In-memory catalog (tests, local development)
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: HashMap<String, CatalogProduct>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(mut self, product: CatalogProduct) -> Self {
        self.products.insert(product.id.clone(), product);
        self
    }
}

#[async_trait]
impl ProductCatalog for StaticCatalog {
    async fn fetch_product(&self, product_id: &str) -> AppResult<Option<CatalogProduct>> {
        Ok(self.products.get(product_id).cloned())
    }
}
