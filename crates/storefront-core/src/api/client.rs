//! API client for the remote product catalog.
//!
//! This module provides the `ApiClient` struct for logging in and for
//! listing, reading, creating, updating and deleting products.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::{header, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::{AuthenticatedUser, Authenticator, Credentials};
use crate::models::{CategoryResponse, Product, ProductDraft};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default base URL of the catalog API
pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Extra attempts when loading a single product
const DETAIL_FETCH_RETRIES: u32 = 2;

/// API client for the product catalog.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against the given base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Exchange credentials for a profile and token.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthenticatedUser, ApiError> {
        let url = self.url("/auth/login");
        debug!(username = %credentials.username, "Sending login request");

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(credentials)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &body));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("login response: {}", e)))?;
        AuthenticatedUser::from_response(value)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: reqwest::Response) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Send a request, backing off and retrying while rate limited, and
    /// decode the JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        url: &str,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<T> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = build()
                .headers(self.auth_headers()?)
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send {} request to {}", method, url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response.json().await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.send("GET", url, || self.client.get(url)).await
    }

    async fn delete<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.send("DELETE", url, || self.client.delete(url)).await
    }

    // ===== Catalog Methods =====

    /// Fetch every product in a single category
    pub async fn fetch_products_by_category(&self, category: &str) -> Result<Vec<Product>> {
        let url = self.url(&format!("/products/category/{}", category));
        let response: CategoryResponse = self
            .get(&url)
            .await
            .with_context(|| format!("Failed to fetch category {}", category))?;
        debug!(category, count = response.products.len(), "Fetched category");
        Ok(response.products)
    }

    /// Fetch several categories in parallel and concatenate them in order.
    /// Any failing category fails the whole fetch.
    pub async fn fetch_products(&self, categories: &[&str]) -> Result<Vec<Product>> {
        let requests = categories
            .iter()
            .map(|category| self.fetch_products_by_category(category));
        let responses = try_join_all(requests).await?;
        Ok(responses.into_iter().flatten().collect())
    }

    /// Fetch one product, retrying a couple of times before giving up
    pub async fn fetch_product(&self, id: i64) -> Result<Product> {
        let url = self.url(&format!("/products/{}", id));
        let mut attempt = 0;
        loop {
            match self.get::<Product>(&url).await {
                Ok(product) => return Ok(product),
                Err(e) if attempt < DETAIL_FETCH_RETRIES => {
                    attempt += 1;
                    warn!(product_id = id, attempt, error = %e, "Product fetch failed, retrying");
                }
                Err(e) => return Err(e.context(format!("Failed to fetch product {}", id))),
            }
        }
    }

    /// Create a product
    pub async fn add_product(&self, draft: &ProductDraft) -> Result<Product> {
        let url = self.url("/products/add");
        self.send("POST", &url, || self.client.post(&url).json(draft))
            .await
            .context("Failed to create product")
    }

    /// Replace the editable fields of a product
    pub async fn update_product(&self, id: i64, draft: &ProductDraft) -> Result<Product> {
        let url = self.url(&format!("/products/{}", id));
        self.send("PUT", &url, || self.client.put(&url).json(draft))
            .await
            .with_context(|| format!("Failed to update product {}", id))
    }

    /// Delete a product. Succeeds only when the API confirms the deletion.
    pub async fn delete_product(&self, id: i64) -> Result<Product> {
        let url = self.url(&format!("/products/{}", id));
        let product: Product = self
            .delete(&url)
            .await
            .with_context(|| format!("Failed to delete product {}", id))?;

        if !product.is_deleted() {
            return Err(ApiError::InvalidResponse(format!(
                "product {} was not marked as deleted",
                id
            ))
            .into());
        }
        Ok(product)
    }
}

#[async_trait]
impl Authenticator for ApiClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthenticatedUser, ApiError> {
        self.login(credentials).await
    }
}
