//! Free-text product search over a catalog snapshot.
//!
//! Matching is a case-insensitive substring test against the product name or
//! brand. Results keep catalog order; there is no relevance ranking.

use gcmp_core::{EngineError, MatchPolicy, Product};

/// Products selected by a query, and whether they are an actual match or the
/// whole catalog returned because nothing matched.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogMatch {
    pub products: Vec<Product>,
    pub fell_back: bool,
}

/// Filters `catalog` by `query`, returning the whole catalog when nothing
/// matches.
///
/// # Errors
///
/// Returns [`EngineError::InvalidQuery`] if `query` is blank after trimming.
pub fn search(query: &str, catalog: &[Product]) -> Result<Vec<Product>, EngineError> {
    search_with_policy(query, catalog, MatchPolicy::FallbackToCatalog).map(|m| m.products)
}

/// Filters `catalog` by `query` under an explicit no-match policy.
///
/// # Errors
///
/// Returns [`EngineError::InvalidQuery`] if `query` is blank after trimming.
pub fn search_with_policy(
    query: &str,
    catalog: &[Product],
    policy: MatchPolicy,
) -> Result<CatalogMatch, EngineError> {
    let needle = normalize_query(query)?;

    let products: Vec<Product> = catalog
        .iter()
        .filter(|product| matches(product, &needle))
        .cloned()
        .collect();

    if products.is_empty() && policy == MatchPolicy::FallbackToCatalog {
        tracing::debug!(
            query = needle,
            catalog_len = catalog.len(),
            "no catalog match; returning full catalog"
        );
        return Ok(CatalogMatch {
            products: catalog.to_vec(),
            fell_back: true,
        });
    }

    Ok(CatalogMatch {
        products,
        fell_back: false,
    })
}

/// Trims and lower-cases a query.
///
/// # Errors
///
/// Returns [`EngineError::InvalidQuery`] if nothing is left after trimming.
pub fn normalize_query(query: &str) -> Result<String, EngineError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidQuery);
    }
    Ok(trimmed.to_lowercase())
}

fn matches(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product
            .brand
            .as_deref()
            .is_some_and(|brand| brand.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_product(id: &str, name: &str, brand: Option<&str>) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            brand: brand.map(str::to_string),
            size: None,
            best_price: None,
            best_price_chain: None,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            make_product(
                "milk_organic_valley_1l",
                "Organic Valley Whole Milk 1L",
                Some("Organic Valley"),
            ),
            make_product("milk_lactantia_2l", "Lactantia 2% Milk 2L", Some("Lactantia")),
            make_product("bread_wonder_white", "Wonder White Bread 675g", Some("Wonder")),
        ]
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn organic_matches_single_product() {
        let result = search("organic", &catalog()).unwrap();
        assert_eq!(ids(&result), vec!["milk_organic_valley_1l"]);
    }

    #[test]
    fn nonexistent_query_falls_back_to_full_catalog() {
        let catalog = catalog();
        let result = search("xyz-nonexistent", &catalog).unwrap();
        assert_eq!(result, catalog);
    }

    #[test]
    fn strict_policy_returns_empty_on_no_match() {
        let result =
            search_with_policy("xyz-nonexistent", &catalog(), MatchPolicy::Strict).unwrap();
        assert!(result.products.is_empty());
        assert!(!result.fell_back);
    }

    #[test]
    fn fallback_is_flagged() {
        let result =
            search_with_policy("xyz", &catalog(), MatchPolicy::FallbackToCatalog).unwrap();
        assert!(result.fell_back);
        assert_eq!(result.products.len(), 3);
    }

    #[test]
    fn blank_query_is_rejected() {
        assert_eq!(search("   ", &catalog()), Err(EngineError::InvalidQuery));
        assert_eq!(search("", &catalog()), Err(EngineError::InvalidQuery));
    }

    #[test]
    fn matching_is_case_insensitive_and_trimmed() {
        let result = search("  MILK ", &catalog()).unwrap();
        assert_eq!(
            ids(&result),
            vec!["milk_organic_valley_1l", "milk_lactantia_2l"]
        );
    }

    #[test]
    fn brand_only_match_is_found() {
        let mut catalog = catalog();
        catalog.push(make_product("pc_cola", "Cola 2L", Some("President's Choice")));
        let result = search("president", &catalog).unwrap();
        assert_eq!(ids(&result), vec!["pc_cola"]);
    }

    #[test]
    fn missing_brand_is_skipped() {
        let catalog = vec![
            make_product("a", "Bananas", None),
            make_product("b", "Apples", Some("Orchard")),
        ];
        let result = search("orchard", &catalog).unwrap();
        assert_eq!(ids(&result), vec!["b"]);
    }

    #[test]
    fn preserves_catalog_order() {
        let catalog = vec![
            make_product("z", "Zesty Milk", None),
            make_product("a", "Almond Milk", None),
            make_product("m", "Milk Chocolate", None),
        ];
        let result = search("milk", &catalog).unwrap();
        assert_eq!(ids(&result), vec!["z", "a", "m"]);
    }

    #[test]
    fn every_match_contains_query_unless_fallback() {
        let catalog = catalog();
        for query in ["milk", "wonder", "2l", "valley", "nothing-here"] {
            let result = search_with_policy(query, &catalog, MatchPolicy::FallbackToCatalog)
                .unwrap();
            if result.fell_back {
                assert_eq!(result.products, catalog);
                continue;
            }
            for product in &result.products {
                assert!(
                    matches(product, query),
                    "{} does not contain {query}",
                    product.name
                );
            }
        }
    }

    #[test]
    fn empty_catalog_with_fallback_is_empty() {
        let result = search("milk", &[]).unwrap();
        assert!(result.is_empty());
    }
}
