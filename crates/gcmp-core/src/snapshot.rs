//! Offline data snapshot: regions, stores, catalog, and quotes in one YAML
//! file. Used for demo mode and tests when no pricing API is configured.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Address, ConfigError, Money, Product};

/// Coordinates for one forward sortation area (first three characters of a
/// postal code).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionEntry {
    pub fsa: String,
    pub city: String,
    pub province: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreEntry {
    pub store_id: String,
    pub chain_name: String,
    pub store_name: String,
    pub address: Address,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// A current price for one product at one store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteEntry {
    pub product_id: String,
    pub store_id: String,
    pub current_price: Money,
    #[serde(default)]
    pub regular_price: Option<Money>,
    #[serde(default)]
    pub on_sale: bool,
    #[serde(default)]
    pub sale_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub sale_end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub regions: Vec<RegionEntry>,
    #[serde(default)]
    pub stores: Vec<StoreEntry>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub quotes: Vec<QuoteEntry>,
}

fn default_active() -> bool {
    true
}

/// Load and validate a snapshot from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_snapshot(path: &Path) -> Result<SnapshotFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SnapshotFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_snapshot(&content)
}

/// Parse and validate snapshot YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_snapshot(content: &str) -> Result<SnapshotFile, ConfigError> {
    let snapshot: SnapshotFile = serde_yaml::from_str(content)?;
    validate_snapshot(&snapshot)?;
    Ok(snapshot)
}

fn validate_snapshot(snapshot: &SnapshotFile) -> Result<(), ConfigError> {
    let mut seen_fsas = HashSet::new();
    for region in &snapshot.regions {
        if region.fsa.len() != 3 {
            return Err(ConfigError::Validation(format!(
                "region '{}' must be a three-character FSA",
                region.fsa
            )));
        }
        if !seen_fsas.insert(region.fsa.to_ascii_uppercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate region: '{}'",
                region.fsa
            )));
        }
    }

    let mut store_ids = HashSet::new();
    for store in &snapshot.stores {
        if store.address.city.trim().is_empty() || store.address.province.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "store '{}' must have a city and province",
                store.store_id
            )));
        }
        if !store_ids.insert(store.store_id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate store id: '{}'",
                store.store_id
            )));
        }
    }

    let mut product_ids = HashSet::new();
    for product in &snapshot.products {
        if product.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "product '{}' must have a name",
                product.id
            )));
        }
        if !product_ids.insert(product.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate product id: '{}'",
                product.id
            )));
        }
    }

    for quote in &snapshot.quotes {
        if !product_ids.contains(quote.product_id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "quote references unknown product '{}'",
                quote.product_id
            )));
        }
        if !store_ids.contains(quote.store_id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "quote references unknown store '{}'",
                quote.store_id
            )));
        }
    }

    Ok(())
}
