//! Price discovery and comparison engine.
//!
//! Three pure components (catalog matching, proximity ranking, price
//! aggregation) and a [`ComparisonSession`] that drives them against the
//! location, catalog and pricing collaborators.

pub mod aggregator;
pub mod matcher;
pub mod ranker;
pub mod session;
pub mod slot;
pub mod sources;

pub use aggregator::{
    aggregate, BestPrice, Comparison, ComparisonSummary, PriceComparison, PriceRange,
};
pub use matcher::{search, search_with_policy, CatalogMatch};
pub use ranker::{nearest, rank};
pub use session::{ComparisonSession, LocatedStores, Phase, SessionOptions, SessionView};
pub use slot::{Settlement, Stage, StageSlot, StageState, StageStatus, StageView, Ticket};
pub use sources::{CatalogService, LocationService, PricingService};
