use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Money;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub province: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

impl Address {
    /// One-line form used on quotes, e.g. `"123 Queen St W, Toronto, ON"`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}, {}, {}", self.street, self.city, self.province)
    }
}

/// A grocery store returned by a location lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    #[serde(rename = "store_id")]
    pub id: String,
    pub chain_name: String,
    pub store_name: String,
    pub address: Address,
    /// Distance from the shopper in kilometres. Only present after a
    /// location lookup has computed it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// A catalog entry as returned by a product search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "product_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    /// Free-form size descriptor, e.g. `"1L"` or `"675g"`.
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub best_price: Option<Money>,
    /// Chain offering `best_price`.
    #[serde(default, rename = "best_price_store")]
    pub best_price_chain: Option<String>,
}

/// One store's price for one product.
///
/// The store is identified by chain, store name and display address rather
/// than by store id, matching what pricing services return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PriceQuoteRecord")]
pub struct PriceQuote {
    pub chain_name: String,
    pub store_name: String,
    pub address: String,
    pub current_price: Money,
    pub regular_price: Money,
    pub on_sale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl PriceQuote {
    /// Amount saved against the regular price. Zero unless the quote is
    /// flagged as on sale; an unflagged price reduction is not a sale.
    #[must_use]
    pub fn savings(&self) -> Money {
        if self.on_sale && self.regular_price > self.current_price {
            self.regular_price.saturating_sub(self.current_price)
        } else {
            Money::ZERO
        }
    }

    /// Whether the sale is running on `today`, honouring the optional start
    /// and end dates (both inclusive).
    #[must_use]
    pub fn is_sale_active(&self, today: NaiveDate) -> bool {
        if !self.on_sale {
            return false;
        }
        if self.sale_start_date.is_some_and(|start| today < start) {
            return false;
        }
        if self.sale_end_date.is_some_and(|end| today > end) {
            return false;
        }
        true
    }
}

/// Wire shape of a quote: `regular_price` may be omitted when there is no
/// discount.
#[derive(Deserialize)]
struct PriceQuoteRecord {
    chain_name: String,
    store_name: String,
    #[serde(default)]
    address: String,
    current_price: Money,
    #[serde(default)]
    regular_price: Option<Money>,
    #[serde(default)]
    on_sale: bool,
    #[serde(default)]
    sale_start_date: Option<NaiveDate>,
    #[serde(default)]
    sale_end_date: Option<NaiveDate>,
    #[serde(default)]
    distance_km: Option<f64>,
}

impl From<PriceQuoteRecord> for PriceQuote {
    fn from(raw: PriceQuoteRecord) -> Self {
        Self {
            chain_name: raw.chain_name,
            store_name: raw.store_name,
            address: raw.address,
            current_price: raw.current_price,
            regular_price: raw.regular_price.unwrap_or(raw.current_price),
            on_sale: raw.on_sale,
            sale_start_date: raw.sale_start_date,
            sale_end_date: raw.sale_end_date,
            distance_km: raw.distance_km,
        }
    }
}
