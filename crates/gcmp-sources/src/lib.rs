//! Data sources for the comparison engine: a REST client for the grocery
//! price API and an offline snapshot loaded from YAML.

mod error;
pub mod http;
mod retry;
pub mod snapshot;
pub mod types;

pub use error::SourceError;
pub use http::{ClientSettings, GroceryApiClient};
pub use snapshot::{SnapshotSource, NEARBY_STORE_LIMIT};
pub use types::{NearbyStoresResponse, PriceCompareResponse, ProductSearchResponse};
