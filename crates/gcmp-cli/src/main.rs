mod backend;
mod commands;
mod render;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use gcmp_core::config::MAX_SEARCH_RADIUS_KM;
use gcmp_core::{AppConfig, MatchPolicy};
use gcmp_engine::{ComparisonSession, SessionOptions};
use tracing_subscriber::EnvFilter;

use crate::backend::Backend;

#[derive(Debug, Parser)]
#[command(name = "gcmp")]
#[command(about = "Compare grocery prices at stores near a Canadian postal code")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List grocery stores near a postal code, nearest first
    Stores {
        /// Canadian postal code (e.g., M5V 3A8)
        postal_code: String,
        /// Search radius in kilometres (capped at 50)
        #[arg(long)]
        radius_km: Option<f64>,
        /// Maximum number of stores to print
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Search the product catalog by name or brand
    Search {
        query: String,
        /// Scope the search to stores near this postal code
        #[arg(long)]
        postal: Option<String>,
        /// Print nothing instead of the full catalog when nothing matches
        #[arg(long)]
        strict: bool,
    },
    /// Compare current prices for one product across stores
    Compare {
        product_id: String,
        #[arg(long)]
        postal: Option<String>,
    },
    /// Locate stores, search, and compare the chosen result in one go
    Shop {
        postal_code: String,
        query: String,
        /// 1-based row of the search results to compare
        #[arg(long, default_value = "1")]
        pick: usize,
    },
}

/// Applies per-command flags on top of the environment configuration.
fn apply_overrides(config: &mut AppConfig, command: &Commands) -> anyhow::Result<()> {
    match command {
        Commands::Stores {
            radius_km, limit, ..
        } => {
            if let Some(radius_km) = *radius_km {
                if !(radius_km.is_finite() && radius_km > 0.0) {
                    anyhow::bail!("--radius-km must be a positive number, got {radius_km}");
                }
                config.search_radius_km = radius_km.min(MAX_SEARCH_RADIUS_KM);
            }
            if let Some(limit) = *limit {
                config.store_display_limit = limit;
            }
        }
        Commands::Search { strict: true, .. } => config.match_policy = MatchPolicy::Strict,
        Commands::Search { .. } | Commands::Compare { .. } | Commands::Shop { .. } => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = gcmp_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        println!("gcmp: run `gcmp --help` for available commands");
        return Ok(());
    };

    apply_overrides(&mut config, &command)?;
    let backend = Arc::new(Backend::from_config(&config)?);
    tracing::debug!(backend = backend.describe(), env = %config.env, "session starting");

    let session = ComparisonSession::with_options(
        Arc::clone(&backend),
        Arc::clone(&backend),
        Arc::clone(&backend),
        SessionOptions {
            match_policy: config.match_policy,
        },
    );

    match command {
        Commands::Stores { postal_code, .. } => {
            commands::run_stores(&session, &postal_code, config.store_display_limit).await
        }
        Commands::Search { query, postal, .. } => {
            commands::run_search(&session, &query, postal.as_deref()).await
        }
        Commands::Compare { product_id, postal } => {
            commands::run_compare(&session, &backend, &product_id, postal.as_deref()).await
        }
        Commands::Shop {
            postal_code,
            query,
            pick,
        } => {
            commands::run_shop(
                &session,
                &postal_code,
                &query,
                pick,
                config.store_display_limit,
            )
            .await
        }
    }
}

#[cfg(test)]
mod tests;
