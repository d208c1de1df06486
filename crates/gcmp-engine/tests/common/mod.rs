//! Scripted collaborators for session tests.
//!
//! Location and pricing fakes answer from a table after a scripted delay, so
//! tests can force responses to arrive out of order under a paused clock.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use gcmp_core::{Address, EngineError, Money, PostalCode, PriceQuote, Product, Store};
use gcmp_engine::{CatalogService, LocationService, PricingService};

type Scripted<T> = (u64, Result<T, EngineError>);

#[derive(Default)]
pub struct FakeLocation {
    by_fsa: HashMap<String, Scripted<Vec<Store>>>,
}

impl FakeLocation {
    pub fn respond(
        mut self,
        fsa: &str,
        delay_ms: u64,
        result: Result<Vec<Store>, EngineError>,
    ) -> Self {
        self.by_fsa.insert(fsa.to_string(), (delay_ms, result));
        self
    }
}

#[async_trait]
impl LocationService for FakeLocation {
    async fn lookup_stores(&self, postal_code: &PostalCode) -> Result<Vec<Store>, EngineError> {
        let Some((delay_ms, result)) = self.by_fsa.get(postal_code.fsa()) else {
            return Err(EngineError::NotFound(format!("no region {}", postal_code.fsa())));
        };
        tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
        result.clone()
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    products: Vec<Product>,
    failure: Option<EngineError>,
    seen_postal_codes: Mutex<Vec<Option<String>>>,
}

impl FakeCatalog {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products,
            ..Self::default()
        }
    }

    pub fn failing(err: EngineError) -> Self {
        Self {
            failure: Some(err),
            ..Self::default()
        }
    }

    pub fn seen_postal_codes(&self) -> Vec<Option<String>> {
        self.seen_postal_codes
            .lock()
            .expect("seen_postal_codes lock")
            .clone()
    }
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn fetch_catalog(
        &self,
        _query: &str,
        postal_code: Option<&PostalCode>,
    ) -> Result<Vec<Product>, EngineError> {
        self.seen_postal_codes
            .lock()
            .expect("seen_postal_codes lock")
            .push(postal_code.map(ToString::to_string));
        tokio::task::yield_now().await;
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.products.clone()),
        }
    }
}

#[derive(Default)]
pub struct FakePricing {
    by_product: HashMap<String, Scripted<Vec<PriceQuote>>>,
}

impl FakePricing {
    pub fn respond(
        mut self,
        product_id: &str,
        delay_ms: u64,
        result: Result<Vec<PriceQuote>, EngineError>,
    ) -> Self {
        self.by_product
            .insert(product_id.to_string(), (delay_ms, result));
        self
    }
}

#[async_trait]
impl PricingService for FakePricing {
    async fn fetch_quotes(
        &self,
        product_id: &str,
        _postal_code: Option<&PostalCode>,
    ) -> Result<Vec<PriceQuote>, EngineError> {
        let Some((delay_ms, result)) = self.by_product.get(product_id) else {
            return Err(EngineError::NotFound(format!("unknown product {product_id}")));
        };
        tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
        result.clone()
    }
}

pub fn store(id: &str, chain: &str, distance_km: Option<f64>) -> Store {
    Store {
        id: id.to_string(),
        chain_name: chain.to_string(),
        store_name: format!("{chain} {id}"),
        address: Address {
            street: "1 Main St".to_string(),
            city: "Toronto".to_string(),
            province: "ON".to_string(),
            postal_code: None,
        },
        distance_km,
    }
}

pub fn product(id: &str, name: &str, brand: Option<&str>) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        brand: brand.map(ToString::to_string),
        size: None,
        best_price: None,
        best_price_chain: None,
    }
}

pub fn quote(chain: &str, current_cents: i64, regular_cents: i64, on_sale: bool) -> PriceQuote {
    PriceQuote {
        chain_name: chain.to_string(),
        store_name: format!("{chain} Downtown"),
        address: "1 Main St, Toronto, ON".to_string(),
        current_price: Money::from_cents(current_cents),
        regular_price: Money::from_cents(regular_cents),
        on_sale,
        sale_start_date: None,
        sale_end_date: None,
        distance_km: None,
    }
}

/// The three-product catalog shared by the search tests.
pub fn dairy_catalog() -> Vec<Product> {
    vec![
        product(
            "milk_organic_valley_1l",
            "Organic Valley Whole Milk 1L",
            Some("Organic Valley"),
        ),
        product("milk_lactantia_2l", "Lactantia 2% Milk 2L", Some("Lactantia")),
        product("bread_wonder_white", "Wonder White Bread", Some("Wonder")),
    ]
}

pub fn toronto_stores() -> Vec<Store> {
    vec![
        store("walmart_toronto_queen", "Walmart", Some(1.2)),
        store("loblaws_toronto_college", "Loblaws", Some(0.8)),
        store("metro_toronto_king", "Metro", Some(1.5)),
    ]
}
