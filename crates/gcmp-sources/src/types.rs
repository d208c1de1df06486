//! Response envelopes of the grocery price API.
//!
//! Only the fields the engine consumes are modelled; everything else in the
//! payloads is ignored.

use gcmp_core::{PriceQuote, Product, Store};
use serde::Deserialize;

/// `GET /locations/postal-code/{code}`
#[derive(Debug, Deserialize)]
pub struct NearbyStoresResponse {
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub nearby_stores: Vec<Store>,
}

/// `GET /products/search`. Older deployments name the list `products`.
#[derive(Debug, Deserialize)]
pub struct ProductSearchResponse {
    #[serde(default, alias = "products")]
    pub results: Vec<Product>,
}

/// `GET /prices/compare`. The summary fields the API also returns are
/// recomputed locally, so only the product and its quotes are read.
#[derive(Debug, Deserialize)]
pub struct PriceCompareResponse {
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub price_comparison: Vec<PriceQuote>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of a 4xx response, e.g.
/// `{"error": "Invalid postal code format", "message": "Please provide ..."}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// The most specific text available: `message`, then `error`.
    pub(crate) fn into_text(self) -> Option<String> {
        self.message.or(self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_response_accepts_products_alias() {
        let body = serde_json::json!({
            "query": "milk",
            "products": [{ "product_id": "milk_lactantia_2l", "name": "Lactantia 2% Milk 2L" }]
        });
        let parsed: ProductSearchResponse = serde_json::from_value(body).expect("parse");
        assert_eq!(parsed.results.len(), 1);
        assert_eq!(parsed.results[0].id, "milk_lactantia_2l");
    }

    #[test]
    fn compare_response_without_quotes_is_empty() {
        let body = serde_json::json!({
            "product": { "product_id": "x", "name": "X" },
            "price_comparison": [],
            "message": "No prices found for this product"
        });
        let parsed: PriceCompareResponse = serde_json::from_value(body).expect("parse");
        assert!(parsed.price_comparison.is_empty());
        assert_eq!(
            parsed.message.as_deref(),
            Some("No prices found for this product")
        );
    }

    #[test]
    fn error_body_prefers_message() {
        let body: ApiErrorBody = serde_json::from_value(serde_json::json!({
            "error": "Invalid postal code format",
            "message": "Please provide a valid Canadian postal code (e.g., M5V 3A8)"
        }))
        .expect("parse");
        assert_eq!(
            body.into_text().as_deref(),
            Some("Please provide a valid Canadian postal code (e.g., M5V 3A8)")
        );
    }
}
