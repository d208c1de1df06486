//! Plain-text tables for the terminal.

use chrono::NaiveDate;
use gcmp_core::{PriceQuote, Product, Store};
use gcmp_engine::{CatalogMatch, Comparison, ComparisonSummary, PriceComparison};

const MISSING: &str = "-";

/// Stores nearest first, at most `limit` rows.
pub(crate) fn stores_table(stores: &[Store], limit: usize) -> String {
    let mut out = format!(
        "{:<32}{:<12}{:<40}{:>8}\n",
        "STORE", "CHAIN", "ADDRESS", "KM"
    );
    for store in stores.iter().take(limit) {
        let distance = store
            .distance_km
            .map_or_else(|| MISSING.to_string(), |km| format!("{km:.2}"));
        out.push_str(&format!(
            "{:<32}{:<12}{:<40}{:>8}\n",
            truncate(&store.store_name, 30),
            truncate(&store.chain_name, 10),
            truncate(&store.address.display(), 38),
            distance
        ));
    }
    if stores.len() > limit {
        out.push_str(&format!("... and {} more\n", stores.len() - limit));
    }
    out
}

/// Search results with a 1-based row number for `shop --pick`.
pub(crate) fn products_table(query: &str, found: &CatalogMatch) -> String {
    if found.products.is_empty() {
        return "No products found matching your search.\n".to_string();
    }

    let mut out = String::new();
    if found.fell_back {
        out.push_str(&format!(
            "no product matched \"{}\"; showing the full catalog\n",
            query.trim()
        ));
    }
    out.push_str(&format!(
        "{:<4}{:<26}{:<36}{:<16}{:<8}BEST PRICE\n",
        "#", "ID", "NAME", "BRAND", "SIZE"
    ));
    for (i, product) in found.products.iter().enumerate() {
        out.push_str(&format!(
            "{:<4}{:<26}{:<36}{:<16}{:<8}{}\n",
            i + 1,
            truncate(&product.id, 24),
            truncate(&product.name, 34),
            truncate(product.brand.as_deref().unwrap_or(MISSING), 14),
            truncate(product.size.as_deref().unwrap_or(MISSING), 6),
            best_price_label(product)
        ));
    }
    out
}

/// Per-store quotes, best-price badges, and the summary block.
pub(crate) fn comparison_table(compared: &PriceComparison, today: NaiveDate) -> String {
    let mut out = format!("{}\n", product_heading(&compared.product));

    let summary = match &compared.comparison {
        Comparison::Empty => {
            out.push_str("no pricing data\n");
            return out;
        }
        Comparison::Summary(summary) => summary,
    };

    out.push_str(&format!(
        "  {:<12}{:<32}{:>9}{:>10}  SALE\n",
        "CHAIN", "STORE", "PRICE", "REGULAR"
    ));
    for quote in &compared.quotes {
        let badge = if summary.is_best(quote) { '*' } else { ' ' };
        out.push_str(&format!(
            "{badge} {:<12}{:<32}{:>9}{:>10}  {}\n",
            truncate(&quote.chain_name, 10),
            truncate(&quote.store_name, 30),
            quote.current_price.to_string(),
            quote.regular_price.to_string(),
            sale_label(quote, today)
        ));
    }
    out.push('\n');
    out.push_str(&summary_lines(summary));
    out
}

fn summary_lines(summary: &ComparisonSummary) -> String {
    let savings = if summary.has_savings() {
        format!("save {} vs highest", summary.best_price.savings_vs_highest)
    } else {
        "no savings".to_string()
    };
    format!(
        "Best price: {} ({savings})\nAverage:    {}\nRange:      {} - {}\n",
        summary.best_price.price,
        summary.average_price,
        summary.price_range.min,
        summary.price_range.max
    )
}

fn product_heading(product: &Product) -> String {
    let details: Vec<&str> = [product.brand.as_deref(), product.size.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if details.is_empty() {
        product.name.clone()
    } else {
        format!("{} ({})", product.name, details.join(", "))
    }
}

fn best_price_label(product: &Product) -> String {
    match (&product.best_price, &product.best_price_chain) {
        (Some(price), Some(chain)) => format!("{price} at {chain}"),
        (Some(price), None) => price.to_string(),
        (None, _) => MISSING.to_string(),
    }
}

fn sale_label(quote: &PriceQuote, today: NaiveDate) -> String {
    if !quote.on_sale {
        return String::new();
    }
    if !quote.is_sale_active(today) {
        return "sale ended".to_string();
    }
    let mut label = format!("save {}", quote.savings());
    if let Some(end) = quote.sale_end_date {
        label.push_str(&format!(" until {end}"));
    }
    label
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        text.to_string()
    }
}
