//! HTTP client for the catalog/stock API.

use std::time::Duration;

use cartkit_cart::{Product, StockLevel};
use cartkit_core::ProductId;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::catalog::{CatalogError, CatalogService};

/// Body of `GET /stock/{id}`.
#[derive(Debug, Deserialize)]
struct StockResponse {
    amount: i64,
}

/// Catalog backed by the REST API:
/// `GET {api_url}/stock/{id}` and `GET {api_url}/products/{id}`.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    api_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpCatalog {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: None,
            client,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        product_id: ProductId,
    ) -> Result<T, CatalogError> {
        let url = format!("{}/{}/{}", self.api_url, path, product_id);
        let mut req = self.client.get(&url);

        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(product_id));
        }
        if !status.is_success() {
            return Err(CatalogError::Api(
                status.as_u16(),
                resp.text().await.unwrap_or_default(),
            ));
        }

        resp.json::<T>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl CatalogService for HttpCatalog {
    async fn stock(&self, product_id: ProductId) -> Result<StockLevel, CatalogError> {
        let body: StockResponse = self.get_json("stock", product_id).await?;
        Ok(StockLevel::new(product_id, body.amount))
    }

    async fn product(&self, product_id: ProductId) -> Result<Product, CatalogError> {
        let product: Product = self.get_json("products", product_id).await?;
        if product.id != product_id {
            return Err(CatalogError::Parse(format!(
                "asked for product {product_id}, catalog answered with {}",
                product.id
            )));
        }
        Ok(product)
    }
}
