//! Reduces one product's per-store quotes into a comparison summary.
//!
//! All arithmetic is on integer cents. The summary is recomputed from the
//! quotes on every call and never updated in place.

use gcmp_core::{Money, PriceQuote, Product};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BestPrice {
    pub price: Money,
    /// Highest current price minus the best price. Zero when every store
    /// charges the same.
    pub savings_vs_highest: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub min: Money,
    pub max: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComparisonSummary {
    pub best_price: BestPrice,
    /// Mean current price, rounded half up to the cent.
    pub average_price: Money,
    pub price_range: PriceRange,
}

impl ComparisonSummary {
    /// Whether `quote` carries the best price. Compared in whole cents, so
    /// it is safe to call per row at render time.
    #[must_use]
    pub fn is_best(&self, quote: &PriceQuote) -> bool {
        quote.current_price.cents() == self.best_price.price.cents()
    }

    /// `false` when all stores are tied; callers should show "no savings"
    /// rather than hide the figure.
    #[must_use]
    pub fn has_savings(&self) -> bool {
        !self.best_price.savings_vs_highest.is_zero()
    }
}

/// Outcome of aggregating a quote set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Comparison {
    Summary(ComparisonSummary),
    /// No quotes were available. Not a zero-priced summary.
    Empty,
}

impl Comparison {
    #[must_use]
    pub fn summary(&self) -> Option<&ComparisonSummary> {
        match self {
            Comparison::Summary(summary) => Some(summary),
            Comparison::Empty => None,
        }
    }
}

/// Aggregates `quotes` for `product`.
///
/// Returns [`Comparison::Empty`] for an empty quote set. Sale flags are taken
/// from each quote as given and quote order is not changed.
#[must_use]
pub fn aggregate(product: &Product, quotes: &[PriceQuote]) -> Comparison {
    let Some(first) = quotes.first() else {
        tracing::debug!(product_id = %product.id, "no quotes; empty comparison");
        return Comparison::Empty;
    };

    let mut min = first.current_price;
    let mut max = first.current_price;
    let mut total: i128 = 0;
    let mut count: i128 = 0;
    for quote in quotes {
        min = min.min(quote.current_price);
        max = max.max(quote.current_price);
        total += i128::from(quote.current_price.cents());
        count += 1;
    }
    let average = mean_half_up(total, count);

    Comparison::Summary(ComparisonSummary {
        best_price: BestPrice {
            price: min,
            savings_vs_highest: max.saturating_sub(min),
        },
        average_price: Money::from_cents(average),
        price_range: PriceRange { min, max },
    })
}

/// Integer mean rounded half away from zero. `count` must be positive.
///
/// The mean of `i64` values lies between their min and max, so the
/// narrowing back to `i64` is lossless.
#[allow(clippy::cast_possible_truncation)]
fn mean_half_up(total: i128, count: i128) -> i64 {
    let mean = if total >= 0 {
        (2 * total + count) / (2 * count)
    } else {
        -((-2 * total + count) / (2 * count))
    };
    mean as i64
}

/// A product, its quotes in arrival order, and their aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceComparison {
    pub product: Product,
    pub quotes: Vec<PriceQuote>,
    pub comparison: Comparison,
}

impl PriceComparison {
    #[must_use]
    pub fn new(product: Product, quotes: Vec<PriceQuote>) -> Self {
        let comparison = aggregate(&product, &quotes);
        Self {
            product,
            quotes,
            comparison,
        }
    }

    /// Per-quote best-price flags, derived from the summary.
    #[must_use]
    pub fn best_flags(&self) -> Vec<bool> {
        match &self.comparison {
            Comparison::Summary(summary) => {
                self.quotes.iter().map(|q| summary.is_best(q)).collect()
            }
            Comparison::Empty => Vec::new(),
        }
    }

    /// Quotes flagged as on sale, in arrival order.
    pub fn sale_quotes(&self) -> impl Iterator<Item = &PriceQuote> {
        self.quotes.iter().filter(|q| q.on_sale)
    }
}
