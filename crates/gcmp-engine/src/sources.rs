//! Collaborators the session fetches data from.
//!
//! The engine only consumes these; realizations live in `gcmp-sources`.
//! Retry and timeout policy belong to the implementation. Each trait is also
//! implemented for `Arc<T>` so one source can back several roles.

use std::sync::Arc;

use async_trait::async_trait;
use gcmp_core::{EngineError, PostalCode, PriceQuote, Product, Store};

/// Resolves a postal code to nearby stores with `distance_km` filled in.
#[async_trait]
pub trait LocationService: Send + Sync {
    /// # Errors
    ///
    /// [`EngineError::NotFound`] when no stores are near the postal code,
    /// [`EngineError::InvalidInput`] when the service rejects it, and
    /// [`EngineError::ServiceUnavailable`] on transport failure.
    async fn lookup_stores(&self, postal_code: &PostalCode) -> Result<Vec<Store>, EngineError>;
}

/// Supplies candidate products for a query. May return a full catalog for
/// client-side matching or an already-filtered list.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// # Errors
    ///
    /// [`EngineError::ServiceUnavailable`] on transport failure.
    async fn fetch_catalog(
        &self,
        query: &str,
        postal_code: Option<&PostalCode>,
    ) -> Result<Vec<Product>, EngineError>;
}

/// Supplies current per-store quotes for one product.
#[async_trait]
pub trait PricingService: Send + Sync {
    /// # Errors
    ///
    /// [`EngineError::NotFound`] for an unknown product and
    /// [`EngineError::ServiceUnavailable`] on transport failure.
    async fn fetch_quotes(
        &self,
        product_id: &str,
        postal_code: Option<&PostalCode>,
    ) -> Result<Vec<PriceQuote>, EngineError>;
}

#[async_trait]
impl<T: LocationService + ?Sized> LocationService for Arc<T> {
    async fn lookup_stores(&self, postal_code: &PostalCode) -> Result<Vec<Store>, EngineError> {
        (**self).lookup_stores(postal_code).await
    }
}

#[async_trait]
impl<T: CatalogService + ?Sized> CatalogService for Arc<T> {
    async fn fetch_catalog(
        &self,
        query: &str,
        postal_code: Option<&PostalCode>,
    ) -> Result<Vec<Product>, EngineError> {
        (**self).fetch_catalog(query, postal_code).await
    }
}

#[async_trait]
impl<T: PricingService + ?Sized> PricingService for Arc<T> {
    async fn fetch_quotes(
        &self,
        product_id: &str,
        postal_code: Option<&PostalCode>,
    ) -> Result<Vec<PriceQuote>, EngineError> {
        (**self).fetch_quotes(product_id, postal_code).await
    }
}
