//! Comparison session: sequences store lookup, product search and price
//! comparison against the collaborators and holds the latest result of each.
//!
//! Every operation takes `&self`, so a shopper may issue a new request while
//! an older one of the same stage is still awaiting its collaborator. The
//! state lock is only held between awaits, never across one. When an older
//! result finally arrives it is discarded (last request wins).

use std::sync::{Mutex, MutexGuard, PoisonError};

use gcmp_core::{EngineError, MatchPolicy, PostalCode, Product, Store};
use serde::Serialize;

use crate::aggregator::PriceComparison;
use crate::matcher::{self, CatalogMatch};
use crate::ranker;
use crate::slot::{Settlement, Stage, StageSlot, StageState, StageView, Ticket};
use crate::sources::{CatalogService, LocationService, PricingService};

/// Where the shopper is in the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    LocatingStores,
    Searching,
    ComparingPrices,
}

impl Phase {
    fn for_stage(stage: Stage) -> Self {
        match stage {
            Stage::Stores => Phase::LocatingStores,
            Stage::Search => Phase::Searching,
            Stage::Comparison => Phase::ComparingPrices,
        }
    }
}

/// Stores found for a postal code, nearest first.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedStores {
    pub postal_code: PostalCode,
    pub stores: Vec<Store>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    pub match_policy: MatchPolicy,
}

/// Everything the presentation layer needs to render the current state.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub phase: Phase,
    pub stores: StageView<LocatedStores>,
    pub search: StageView<CatalogMatch>,
    pub comparison: StageView<PriceComparison>,
    /// Shopper-facing text for the most recent failure, if it is still
    /// relevant.
    pub message: Option<String>,
}

struct SessionState {
    phase: Phase,
    /// Phase in effect when each stage's latest request was issued, indexed
    /// by [`stage_index`].
    phase_before: [Phase; 3],
    message: Option<(Stage, String)>,
    stores: StageSlot<LocatedStores>,
    search: StageSlot<CatalogMatch>,
    comparison: StageSlot<PriceComparison>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            phase: Phase::Idle,
            phase_before: [Phase::Idle; 3],
            message: None,
            stores: StageSlot::new(Stage::Stores),
            search: StageSlot::new(Stage::Search),
            comparison: StageSlot::new(Stage::Comparison),
        }
    }

    fn stores_mut(&mut self) -> &mut StageSlot<LocatedStores> {
        &mut self.stores
    }

    fn search_mut(&mut self) -> &mut StageSlot<CatalogMatch> {
        &mut self.search
    }

    fn comparison_mut(&mut self) -> &mut StageSlot<PriceComparison> {
        &mut self.comparison
    }

    fn begin(&mut self, stage: Stage) -> Ticket {
        // A request superseding one still in flight keeps the phase saved by
        // the first.
        if !self.is_pending(stage) {
            self.phase_before[stage_index(stage)] = self.phase;
        }
        self.phase = Phase::for_stage(stage);
        if self.message.as_ref().is_some_and(|(s, _)| *s == stage) {
            self.message = None;
        }
        match stage {
            Stage::Stores => self.stores.begin(),
            Stage::Search => self.search.begin(),
            Stage::Comparison => self.comparison.begin(),
        }
    }

    fn is_pending(&self, stage: Stage) -> bool {
        let state = match stage {
            Stage::Stores => self.stores.state(),
            Stage::Search => self.search.state(),
            Stage::Comparison => self.comparison.state(),
        };
        state == StageState::InProgress
    }

    fn record_failure(&mut self, stage: Stage, err: &EngineError) {
        if self.phase == Phase::for_stage(stage) {
            self.phase = self.phase_before[stage_index(stage)];
        }
        self.message = Some((stage, failure_message(stage, err)));
    }

    fn record_success(&mut self, stage: Stage) {
        if self.message.as_ref().is_some_and(|(s, _)| *s == stage) {
            self.message = None;
        }
    }

    fn reset(&mut self) {
        self.stores.clear();
        self.search.clear();
        self.comparison.clear();
        self.phase = Phase::Idle;
        self.phase_before = [Phase::Idle; 3];
        self.message = None;
    }
}

fn stage_index(stage: Stage) -> usize {
    match stage {
        Stage::Stores => 0,
        Stage::Search => 1,
        Stage::Comparison => 2,
    }
}

fn failure_message(stage: Stage, err: &EngineError) -> String {
    let text = match (stage, err) {
        (_, EngineError::InvalidQuery) => err.user_message(),
        (Stage::Stores, EngineError::InvalidInput(_) | EngineError::NotFound(_)) => {
            "Invalid postal code or no stores found in your area."
        }
        (Stage::Search, EngineError::NotFound(_)) => "No products found matching your search.",
        (Stage::Search, EngineError::ServiceUnavailable(_)) => {
            "Unable to search products. Please try again."
        }
        (Stage::Comparison, EngineError::NotFound(_)) => {
            "No pricing data is available for this product."
        }
        (Stage::Comparison, EngineError::ServiceUnavailable(_)) => {
            "Unable to load price comparison. Please try again."
        }
        _ => err.user_message(),
    };
    text.to_string()
}

pub struct ComparisonSession<L, C, P> {
    location: L,
    catalog: C,
    pricing: P,
    options: SessionOptions,
    state: Mutex<SessionState>,
}

impl<L, C, P> ComparisonSession<L, C, P>
where
    L: LocationService,
    C: CatalogService,
    P: PricingService,
{
    pub fn new(location: L, catalog: C, pricing: P) -> Self {
        Self::with_options(location, catalog, pricing, SessionOptions::default())
    }

    pub fn with_options(location: L, catalog: C, pricing: P, options: SessionOptions) -> Self {
        Self {
            location,
            catalog,
            pricing,
            options,
            state: Mutex::new(SessionState::new()),
        }
    }

    /// Looks up stores near `postal_input` and ranks them by distance.
    ///
    /// # Errors
    ///
    /// Returns the lookup error when this request is still the latest one;
    /// the stage keeps its previous stores. A superseded request returns
    /// `Ok(Settlement::Superseded)` whatever its outcome.
    pub async fn locate_stores(&self, postal_input: &str) -> Result<Settlement, EngineError> {
        let ticket = self.lock().begin(Stage::Stores);

        let result = match PostalCode::parse(postal_input) {
            Ok(postal_code) => self
                .location
                .lookup_stores(&postal_code)
                .await
                .map(|stores| LocatedStores {
                    stores: ranker::rank(&stores),
                    postal_code,
                }),
            Err(err) => Err(err),
        };

        if let Ok(located) = &result {
            tracing::info!(
                postal_code = %located.postal_code,
                store_count = located.stores.len(),
                "stores located"
            );
        }
        self.finish(ticket, result, SessionState::stores_mut)
    }

    /// Searches the catalog, near the last located postal code if any.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidQuery`] for a blank query, otherwise the
    /// catalog service error, when this request is still the latest one.
    pub async fn search_products(&self, query: &str) -> Result<Settlement, EngineError> {
        let ticket = self.lock().begin(Stage::Search);

        let result = match matcher::normalize_query(query) {
            Ok(_) => {
                let postal_code = self.current_postal_code();
                self.catalog
                    .fetch_catalog(query.trim(), postal_code.as_ref())
                    .await
                    .and_then(|catalog| {
                        matcher::search_with_policy(query, &catalog, self.options.match_policy)
                    })
            }
            Err(err) => Err(err),
        };

        if let Ok(found) = &result {
            tracing::info!(
                query = query.trim(),
                result_count = found.products.len(),
                fell_back = found.fell_back,
                "products searched"
            );
        }
        self.finish(ticket, result, SessionState::search_mut)
    }

    /// Fetches quotes for `product` and aggregates them.
    ///
    /// An empty quote set is a successful, empty comparison.
    ///
    /// # Errors
    ///
    /// Returns the pricing service error when this request is still the
    /// latest one.
    pub async fn select_product(&self, product: Product) -> Result<Settlement, EngineError> {
        let ticket = self.lock().begin(Stage::Comparison);
        let postal_code = self.current_postal_code();

        let result = self
            .pricing
            .fetch_quotes(&product.id, postal_code.as_ref())
            .await
            .map(|quotes| PriceComparison::new(product, quotes));

        if let Ok(compared) = &result {
            tracing::info!(
                product_id = %compared.product.id,
                quote_count = compared.quotes.len(),
                "prices compared"
            );
        }
        self.finish(ticket, result, SessionState::comparison_mut)
    }

    /// Returns to `Idle`, dropping all results. Requests still in flight
    /// will be discarded when they arrive.
    pub fn reset(&self) {
        self.lock().reset();
        tracing::debug!("session reset");
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        let state = self.lock();
        SessionView {
            phase: state.phase,
            stores: state.stores.view(),
            search: state.search.view(),
            comparison: state.comparison.view(),
            message: state.message.as_ref().map(|(_, text)| text.clone()),
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// Postal code of the last successful store lookup.
    #[must_use]
    pub fn current_postal_code(&self) -> Option<PostalCode> {
        self.lock()
            .stores
            .value()
            .map(|located| located.postal_code.clone())
    }

    fn finish<T>(
        &self,
        ticket: Ticket,
        result: Result<T, EngineError>,
        slot: fn(&mut SessionState) -> &mut StageSlot<T>,
    ) -> Result<Settlement, EngineError> {
        let failure = result.as_ref().err().cloned();
        let mut state = self.lock();

        if slot(&mut *state).settle(ticket, result) == Settlement::Superseded {
            tracing::debug!(stage = %ticket.stage(), seq = ticket.seq(), "result superseded");
            return Ok(Settlement::Superseded);
        }

        match failure {
            Some(err) => {
                tracing::warn!(stage = %ticket.stage(), error = %err, "request failed");
                state.record_failure(ticket.stage(), &err);
                Err(err)
            }
            None => {
                state.record_success(ticket.stage());
                Ok(Settlement::Applied)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
