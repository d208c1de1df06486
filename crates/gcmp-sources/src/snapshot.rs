//! Offline source backed by a [`SnapshotFile`].
//!
//! Stores are located by great-circle distance from the centroid of the
//! postal code's forward sortation area. The catalog and quotes are served
//! straight from the snapshot.

use std::collections::HashMap;

use async_trait::async_trait;
use gcmp_core::config::MAX_SEARCH_RADIUS_KM;
use gcmp_core::snapshot::{QuoteEntry, RegionEntry, StoreEntry};
use gcmp_core::{
    load_snapshot, AppConfig, ConfigError, EngineError, PostalCode, PriceQuote, Product,
    SnapshotFile, Store,
};
use gcmp_engine::{CatalogService, LocationService, PricingService};
use geo::{HaversineDistance, Point};

/// At most this many stores are returned per lookup, nearest first.
pub const NEARBY_STORE_LIMIT: usize = 20;

const DEFAULT_RADIUS_KM: f64 = 10.0;

pub struct SnapshotSource {
    regions: HashMap<String, RegionEntry>,
    stores: Vec<StoreEntry>,
    /// Store id -> index into `stores`.
    store_index: HashMap<String, usize>,
    catalog: Vec<Product>,
    /// Product id -> quotes in file order.
    quotes: HashMap<String, Vec<QuoteEntry>>,
    radius_km: f64,
    store_limit: usize,
}

impl SnapshotSource {
    #[must_use]
    pub fn new(snapshot: SnapshotFile) -> Self {
        let SnapshotFile {
            regions,
            stores,
            products,
            quotes,
        } = snapshot;

        let regions = regions
            .into_iter()
            .map(|region| (region.fsa.to_ascii_uppercase(), region))
            .collect();
        let store_index = stores
            .iter()
            .enumerate()
            .map(|(i, store)| (store.store_id.clone(), i))
            .collect();

        let mut by_product: HashMap<String, Vec<QuoteEntry>> = HashMap::new();
        for quote in quotes {
            by_product
                .entry(quote.product_id.clone())
                .or_default()
                .push(quote);
        }

        let mut source = Self {
            regions,
            stores,
            store_index,
            catalog: Vec::new(),
            quotes: by_product,
            radius_km: DEFAULT_RADIUS_KM,
            store_limit: NEARBY_STORE_LIMIT,
        };
        source.catalog = products
            .into_iter()
            .map(|product| source.with_best_price(product))
            .collect();
        source
    }

    /// Loads the snapshot named by `config.snapshot_path` and applies the
    /// configured search radius.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the snapshot cannot be read, parsed, or
    /// fails validation.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let snapshot = load_snapshot(&config.snapshot_path)?;
        tracing::info!(
            path = %config.snapshot_path.display(),
            stores = snapshot.stores.len(),
            products = snapshot.products.len(),
            quotes = snapshot.quotes.len(),
            "snapshot loaded"
        );
        Ok(Self::new(snapshot).with_radius_km(config.search_radius_km))
    }

    /// Search radius, clamped to `(0, MAX_SEARCH_RADIUS_KM]`. Non-positive
    /// values keep the current radius.
    #[must_use]
    pub fn with_radius_km(mut self, radius_km: f64) -> Self {
        if radius_km > 0.0 {
            self.radius_km = radius_km.min(MAX_SEARCH_RADIUS_KM);
        }
        self
    }

    #[must_use]
    pub fn with_store_limit(mut self, limit: usize) -> Self {
        self.store_limit = limit.min(NEARBY_STORE_LIMIT);
        self
    }

    #[must_use]
    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Active stores within `radius_km` of `postal_code`, nearest first.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] when the postal code's area is not in the
    /// snapshot or no store is within range.
    pub fn stores_near(
        &self,
        postal_code: &PostalCode,
        radius_km: f64,
    ) -> Result<Vec<Store>, EngineError> {
        let region = self.region_for(postal_code)?;
        let radius_km = radius_km.clamp(0.0, MAX_SEARCH_RADIUS_KM);

        let mut nearby: Vec<Store> = self
            .stores
            .iter()
            .filter(|entry| entry.is_active)
            .filter_map(|entry| {
                let distance = distance_km(region, entry);
                (distance <= radius_km).then(|| to_store(entry, round_km(distance)))
            })
            .collect();

        nearby.sort_by(|a, b| {
            a.distance_km
                .unwrap_or(f64::INFINITY)
                .total_cmp(&b.distance_km.unwrap_or(f64::INFINITY))
        });
        nearby.truncate(self.store_limit);

        if nearby.is_empty() {
            return Err(EngineError::NotFound(format!(
                "no stores within {radius_km} km of {postal_code}"
            )));
        }
        Ok(nearby)
    }

    /// Quotes for `product_id` at active stores, in snapshot order.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] for a product not in the catalog.
    pub fn quotes_for(
        &self,
        product_id: &str,
        postal_code: Option<&PostalCode>,
    ) -> Result<Vec<PriceQuote>, EngineError> {
        if self.product(product_id).is_none() {
            return Err(EngineError::NotFound(format!("unknown product {product_id}")));
        }

        let region = postal_code.and_then(|code| self.region_for(code).ok());
        let quotes = self
            .quotes
            .get(product_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter_map(|quote| {
                let store = self.active_store(&quote.store_id)?;
                let distance = region.map(|r| round_km(distance_km(r, store)));
                Some(to_quote(quote, store, distance))
            })
            .collect();
        Ok(quotes)
    }

    #[must_use]
    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    /// Catalog entry by exact id.
    #[must_use]
    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.catalog.iter().find(|p| p.id == product_id)
    }

    fn region_for(&self, postal_code: &PostalCode) -> Result<&RegionEntry, EngineError> {
        self.regions.get(postal_code.fsa()).ok_or_else(|| {
            EngineError::NotFound(format!("no location data for area {}", postal_code.fsa()))
        })
    }

    fn active_store(&self, store_id: &str) -> Option<&StoreEntry> {
        self.store_index
            .get(store_id)
            .and_then(|&i| self.stores.get(i))
            .filter(|store| store.is_active)
    }

    /// Fills `best_price`/`best_price_chain` from the snapshot's quotes.
    /// Products without quotes keep whatever the file said.
    fn with_best_price(&self, mut product: Product) -> Product {
        let best = self
            .quotes
            .get(&product.id)
            .into_iter()
            .flatten()
            .filter_map(|quote| Some((quote, self.active_store(&quote.store_id)?)))
            .min_by_key(|(quote, _)| quote.current_price);
        if let Some((quote, store)) = best {
            product.best_price = Some(quote.current_price);
            product.best_price_chain = Some(store.chain_name.clone());
        }
        product
    }
}

fn distance_km(region: &RegionEntry, store: &StoreEntry) -> f64 {
    let origin = Point::new(region.longitude, region.latitude);
    let target = Point::new(store.longitude, store.latitude);
    origin.haversine_distance(&target) / 1000.0
}

fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

fn to_store(entry: &StoreEntry, distance_km: f64) -> Store {
    Store {
        id: entry.store_id.clone(),
        chain_name: entry.chain_name.clone(),
        store_name: entry.store_name.clone(),
        address: entry.address.clone(),
        distance_km: Some(distance_km),
    }
}

fn to_quote(quote: &QuoteEntry, store: &StoreEntry, distance_km: Option<f64>) -> PriceQuote {
    PriceQuote {
        chain_name: store.chain_name.clone(),
        store_name: store.store_name.clone(),
        address: store.address.display(),
        current_price: quote.current_price,
        regular_price: quote.regular_price.unwrap_or(quote.current_price),
        on_sale: quote.on_sale,
        sale_start_date: quote.sale_start_date,
        sale_end_date: quote.sale_end_date,
        distance_km,
    }
}

#[async_trait]
impl LocationService for SnapshotSource {
    async fn lookup_stores(&self, postal_code: &PostalCode) -> Result<Vec<Store>, EngineError> {
        self.stores_near(postal_code, self.radius_km)
    }
}

#[async_trait]
impl CatalogService for SnapshotSource {
    /// Returns the whole catalog; the engine does the matching.
    async fn fetch_catalog(
        &self,
        _query: &str,
        _postal_code: Option<&PostalCode>,
    ) -> Result<Vec<Product>, EngineError> {
        Ok(self.catalog.clone())
    }
}

#[async_trait]
impl PricingService for SnapshotSource {
    async fn fetch_quotes(
        &self,
        product_id: &str,
        postal_code: Option<&PostalCode>,
    ) -> Result<Vec<PriceQuote>, EngineError> {
        self.quotes_for(product_id, postal_code)
    }
}
