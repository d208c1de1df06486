//! HTTP client for the grocery price REST API.
//!
//! Wraps `reqwest` with status-code mapping, retry on transient failures and
//! typed response deserialization. Implements the engine's three collaborator
//! traits so a [`gcmp_engine::ComparisonSession`] can run against it directly.

use std::time::Duration;

use async_trait::async_trait;
use gcmp_core::{AppConfig, EngineError, PostalCode, PriceQuote, Product, Store};
use gcmp_engine::{CatalogService, LocationService, PricingService};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::SourceError;
use crate::retry::retry_with_backoff;
use crate::types::{ApiErrorBody, NearbyStoresResponse, PriceCompareResponse, ProductSearchResponse};

/// Transport and query settings for [`GroceryApiClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure for retriable errors.
    pub max_retries: u32,
    /// Base delay for exponential back-off: `backoff_base_ms * 2^(n-1)`.
    pub backoff_base_ms: u64,
    /// Radius sent with store lookups.
    pub radius_km: f64,
    /// Maximum products requested per search.
    pub search_limit: u32,
}

impl ClientSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
            radius_km: config.search_radius_km,
            search_limit: config.search_limit,
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "gcmp/0.1 (grocery-price-compare)".to_owned(),
            max_retries: 3,
            backoff_base_ms: 500,
            radius_km: 10.0,
            search_limit: 20,
        }
    }
}

/// Client for the grocery price API.
///
/// `base_url` is the API root, e.g. `http://localhost:5000/api`; endpoint
/// paths are resolved relative to it.
pub struct GroceryApiClient {
    client: Client,
    base_url: Url,
    settings: ClientSettings,
}

impl GroceryApiClient {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SourceError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(base_url: &str, settings: ClientSettings) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .build()?;

        // Exactly one trailing slash so `Url::join` appends to the API root
        // instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| SourceError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(SourceError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "URL cannot be used as a base".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            settings,
        })
    }

    /// # Errors
    ///
    /// Same as [`GroceryApiClient::new`].
    pub fn from_config(base_url: &str, config: &AppConfig) -> Result<Self, SourceError> {
        Self::new(base_url, ClientSettings::from_config(config))
    }

    #[must_use]
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Stores within `radius_km` of `postal_code`, as the API returns them.
    ///
    /// # Errors
    ///
    /// - [`SourceError::BadRequest`] if the API rejects the postal code.
    /// - [`SourceError::Http`], [`SourceError::UnexpectedStatus`] or
    ///   [`SourceError::RateLimited`] after all retries are exhausted.
    /// - [`SourceError::Deserialize`] if the body has an unexpected shape.
    pub async fn nearby_stores(
        &self,
        postal_code: &PostalCode,
        radius_km: f64,
    ) -> Result<NearbyStoresResponse, SourceError> {
        let mut url = self.endpoint(&format!("locations/postal-code/{}", postal_code.compact()))?;
        url.query_pairs_mut()
            .append_pair("radius_km", &radius_km.to_string());
        self.get_json(url, &format!("nearby stores for {postal_code}"))
            .await
    }

    /// Products matching `query`, optionally scoped to a postal code.
    ///
    /// # Errors
    ///
    /// As for [`GroceryApiClient::nearby_stores`].
    pub async fn search_products(
        &self,
        query: &str,
        postal_code: Option<&PostalCode>,
        limit: u32,
    ) -> Result<Vec<Product>, SourceError> {
        let mut url = self.endpoint("products/search")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query);
            pairs.append_pair("limit", &limit.to_string());
            if let Some(code) = postal_code {
                pairs.append_pair("postal_code", code.as_str());
            }
        }
        let response: ProductSearchResponse = self
            .get_json(url, &format!("product search (query={query})"))
            .await?;
        Ok(response.results)
    }

    /// Current quotes for `product_id`.
    ///
    /// # Errors
    ///
    /// [`SourceError::NotFound`] for an unknown product, otherwise as for
    /// [`GroceryApiClient::nearby_stores`].
    pub async fn compare_prices(
        &self,
        product_id: &str,
        postal_code: Option<&PostalCode>,
    ) -> Result<PriceCompareResponse, SourceError> {
        let mut url = self.endpoint("prices/compare")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("product_id", product_id);
            if let Some(code) = postal_code {
                pairs.append_pair("postal_code", code.as_str());
            }
        }
        self.get_json(url, &format!("price comparison (product_id={product_id})"))
            .await
    }

    /// Catalog entry for `product_id`, read from the price comparison
    /// envelope. `None` when the API omits it.
    ///
    /// # Errors
    ///
    /// As for [`GroceryApiClient::compare_prices`].
    pub async fn product_details(
        &self,
        product_id: &str,
        postal_code: Option<&PostalCode>,
    ) -> Result<Option<Product>, SourceError> {
        let response = self.compare_prices(product_id, postal_code).await?;
        Ok(response.product)
    }

    fn endpoint(&self, path: &str) -> Result<Url, SourceError> {
        self.base_url
            .join(path)
            .map_err(|e| SourceError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot join '{path}': {e}"),
            })
    }

    /// Sends a GET with retry, maps error statuses, and parses the body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<T, SourceError> {
        tracing::debug!(%url, "grocery API request");
        retry_with_backoff(self.settings.max_retries, self.settings.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url.clone())
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    return Err(SourceError::RateLimited {
                        url: url.to_string(),
                    });
                }

                if status == StatusCode::NOT_FOUND {
                    return Err(SourceError::NotFound {
                        url: url.to_string(),
                    });
                }

                if status == StatusCode::BAD_REQUEST {
                    let body = response.text().await.unwrap_or_default();
                    let message = serde_json::from_str::<ApiErrorBody>(&body)
                        .ok()
                        .and_then(ApiErrorBody::into_text)
                        .unwrap_or_else(|| "request rejected".to_owned());
                    return Err(SourceError::BadRequest {
                        url: url.to_string(),
                        message,
                    });
                }

                if !status.is_success() {
                    return Err(SourceError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<T>(&body).map_err(|e| SourceError::Deserialize {
                    context: context.to_owned(),
                    source: e,
                })
            }
        })
        .await
    }
}

#[async_trait]
impl LocationService for GroceryApiClient {
    async fn lookup_stores(&self, postal_code: &PostalCode) -> Result<Vec<Store>, EngineError> {
        let radius_km = self.settings.radius_km;
        let response = self.nearby_stores(postal_code, radius_km).await?;
        if response.nearby_stores.is_empty() {
            return Err(EngineError::NotFound(format!(
                "no stores within {radius_km} km of {postal_code}"
            )));
        }
        Ok(response.nearby_stores)
    }
}

#[async_trait]
impl CatalogService for GroceryApiClient {
    async fn fetch_catalog(
        &self,
        query: &str,
        postal_code: Option<&PostalCode>,
    ) -> Result<Vec<Product>, EngineError> {
        Ok(self
            .search_products(query, postal_code, self.settings.search_limit)
            .await?)
    }
}

#[async_trait]
impl PricingService for GroceryApiClient {
    async fn fetch_quotes(
        &self,
        product_id: &str,
        postal_code: Option<&PostalCode>,
    ) -> Result<Vec<PriceQuote>, EngineError> {
        let response = self.compare_prices(product_id, postal_code).await?;
        if let Some(message) = response.message.as_deref() {
            tracing::debug!(product_id, message, "price comparison note");
        }
        Ok(response.price_comparison)
    }
}
