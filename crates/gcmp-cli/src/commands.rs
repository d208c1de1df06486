//! Command handlers. Each runs one or more session stages and prints the
//! settled result.

use std::sync::Arc;

use anyhow::Context;
use gcmp_core::{EngineError, Product};
use gcmp_engine::{ComparisonSession, Settlement};

use crate::backend::Backend;
use crate::render;

pub(crate) type Session = ComparisonSession<Arc<Backend>, Arc<Backend>, Arc<Backend>>;

/// Turns a stage failure into an error carrying the shopper-facing message.
fn settled(session: &Session, result: Result<Settlement, EngineError>) -> anyhow::Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(err) => {
            let message = session
                .view()
                .message
                .unwrap_or_else(|| err.user_message().to_string());
            Err(anyhow::Error::new(err).context(message))
        }
    }
}

/// Looks up stores for `postal`, warning instead of failing so later stages
/// can still run without a location.
async fn locate_or_warn(session: &Session, postal: &str) -> bool {
    let result = session.locate_stores(postal).await;
    match settled(session, result) {
        Ok(()) => true,
        Err(err) => {
            eprintln!("warning: {err}; continuing without a location");
            false
        }
    }
}

fn print_stores(session: &Session, display_limit: usize) {
    if let Some(located) = session.view().stores.value {
        println!(
            "{} store(s) near {}:",
            located.stores.len(),
            located.postal_code
        );
        print!("{}", render::stores_table(&located.stores, display_limit));
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Stores near a postal code.
///
/// # Errors
///
/// Returns an error if the postal code is invalid or no stores are found.
pub(crate) async fn run_stores(
    session: &Session,
    postal: &str,
    display_limit: usize,
) -> anyhow::Result<()> {
    let result = session.locate_stores(postal).await;
    settled(session, result)?;
    print_stores(session, display_limit);
    Ok(())
}

/// Product search, optionally scoped to a postal code.
///
/// # Errors
///
/// Returns an error if the query is blank or the catalog is unavailable.
pub(crate) async fn run_search(
    session: &Session,
    query: &str,
    postal: Option<&str>,
) -> anyhow::Result<()> {
    if let Some(postal) = postal {
        locate_or_warn(session, postal).await;
    }
    let result = session.search_products(query).await;
    settled(session, result)?;

    let found = session
        .view()
        .search
        .value
        .context("search settled without a result")?;
    print!("{}", render::products_table(query, &found));
    Ok(())
}

/// Price comparison for one product id.
///
/// # Errors
///
/// Returns an error if the product is unknown or pricing is unavailable.
pub(crate) async fn run_compare(
    session: &Session,
    backend: &Backend,
    product_id: &str,
    postal: Option<&str>,
) -> anyhow::Result<()> {
    if let Some(postal) = postal {
        locate_or_warn(session, postal).await;
    }
    let product = resolve_product(session, backend, product_id).await;
    compare_and_print(session, product).await
}

/// Stores, search, and comparison in one session.
///
/// # Errors
///
/// Returns an error if the search fails, `pick` is out of range, or the
/// comparison fails. A failed store lookup only prints a warning.
pub(crate) async fn run_shop(
    session: &Session,
    postal: &str,
    query: &str,
    pick: usize,
    display_limit: usize,
) -> anyhow::Result<()> {
    if locate_or_warn(session, postal).await {
        print_stores(session, display_limit);
        println!();
    }

    let result = session.search_products(query).await;
    settled(session, result)?;
    let found = session
        .view()
        .search
        .value
        .context("search settled without a result")?;
    print!("{}", render::products_table(query, &found));
    println!();

    let product = pick
        .checked_sub(1)
        .and_then(|i| found.products.get(i))
        .cloned()
        .with_context(|| {
            format!(
                "--pick {pick} is out of range; {} product(s) listed",
                found.products.len()
            )
        })?;
    compare_and_print(session, product).await
}

async fn compare_and_print(session: &Session, product: Product) -> anyhow::Result<()> {
    let result = session.select_product(product).await;
    settled(session, result)?;

    let compared = session
        .view()
        .comparison
        .value
        .context("comparison settled without a result")?;
    print!("{}", render::comparison_table(&compared, today()));
    Ok(())
}

/// Looks up the catalog entry for `product_id` directly, falling back to a
/// bare product carrying only the id. Leaves the search stage untouched.
pub(crate) async fn resolve_product(
    session: &Session,
    backend: &Backend,
    product_id: &str,
) -> Product {
    let postal_code = session.current_postal_code();
    match backend.find_product(product_id, postal_code.as_ref()).await {
        Ok(Some(product)) => return product,
        Ok(None) => {
            eprintln!("note: {product_id} has no catalog details; comparing by id only");
        }
        Err(err) => {
            tracing::warn!(product_id, error = %err, "product lookup failed; comparing by id");
        }
    }
    Product {
        id: product_id.to_string(),
        name: product_id.to_string(),
        brand: None,
        size: None,
        best_price: None,
        best_price_chain: None,
    }
}
