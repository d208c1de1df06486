//! Chooses between the live API and the offline snapshot at startup.

use async_trait::async_trait;
use gcmp_core::{AppConfig, EngineError, PostalCode, PriceQuote, Product, Store};
use gcmp_engine::{CatalogService, LocationService, PricingService};
use gcmp_sources::{GroceryApiClient, SnapshotSource};

pub(crate) enum Backend {
    Api(GroceryApiClient),
    Snapshot(SnapshotSource),
}

impl Backend {
    /// Uses the API when `GCMP_API_BASE_URL` is set, the snapshot otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built or the snapshot
    /// cannot be loaded.
    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        match config.api_base_url.as_deref() {
            Some(base_url) => {
                tracing::info!(base_url, "using grocery price API");
                Ok(Self::Api(GroceryApiClient::from_config(base_url, config)?))
            }
            None => {
                tracing::info!(path = %config.snapshot_path.display(), "using offline snapshot");
                Ok(Self::Snapshot(SnapshotSource::from_config(config)?))
            }
        }
    }

    /// Catalog entry for an exact product id. The API serves it alongside
    /// the price comparison; the snapshot reads its own catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub(crate) async fn find_product(
        &self,
        product_id: &str,
        postal_code: Option<&PostalCode>,
    ) -> Result<Option<Product>, EngineError> {
        match self {
            Backend::Api(client) => Ok(client.product_details(product_id, postal_code).await?),
            Backend::Snapshot(source) => Ok(source.product(product_id).cloned()),
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Backend::Api(_) => "api",
            Backend::Snapshot(_) => "snapshot",
        }
    }
}

#[async_trait]
impl LocationService for Backend {
    async fn lookup_stores(&self, postal_code: &PostalCode) -> Result<Vec<Store>, EngineError> {
        match self {
            Backend::Api(client) => client.lookup_stores(postal_code).await,
            Backend::Snapshot(source) => source.lookup_stores(postal_code).await,
        }
    }
}

#[async_trait]
impl CatalogService for Backend {
    async fn fetch_catalog(
        &self,
        query: &str,
        postal_code: Option<&PostalCode>,
    ) -> Result<Vec<Product>, EngineError> {
        match self {
            Backend::Api(client) => client.fetch_catalog(query, postal_code).await,
            Backend::Snapshot(source) => source.fetch_catalog(query, postal_code).await,
        }
    }
}

#[async_trait]
impl PricingService for Backend {
    async fn fetch_quotes(
        &self,
        product_id: &str,
        postal_code: Option<&PostalCode>,
    ) -> Result<Vec<PriceQuote>, EngineError> {
        match self {
            Backend::Api(client) => client.fetch_quotes(product_id, postal_code).await,
            Backend::Snapshot(source) => source.fetch_quotes(product_id, postal_code).await,
        }
    }
}
