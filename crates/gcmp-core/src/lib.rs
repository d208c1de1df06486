pub mod app_config;
pub mod config;
mod error;
mod model;
mod money;
mod postal;
pub mod snapshot;

pub use app_config::{AppConfig, Environment, MatchPolicy};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, EngineError};
pub use model::{Address, PriceQuote, Product, Store};
pub use money::Money;
pub use postal::PostalCode;
pub use snapshot::{load_snapshot, SnapshotFile};
