use crate::app_config::{AppConfig, Environment, MatchPolicy};
use crate::ConfigError;

/// Largest search radius the location service will honour.
pub const MAX_SEARCH_RADIUS_KM: f64 = 50.0;

/// Largest number of products a single search may return.
pub const MAX_SEARCH_LIMIT: u32 = 50;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function,
/// so tests can drive it from a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("GCMP_ENV", "development"))?;
    let log_level = or_default("GCMP_LOG_LEVEL", "info");
    let api_base_url = lookup("GCMP_API_BASE_URL")
        .ok()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());
    let snapshot_path = PathBuf::from(or_default("GCMP_SNAPSHOT_PATH", "./config/demo.yaml"));

    let request_timeout_secs = parse_u64("GCMP_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("GCMP_USER_AGENT", "gcmp/0.1 (grocery-price-compare)");
    let max_retries = parse_u32("GCMP_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("GCMP_RETRY_BACKOFF_BASE_MS", "500")?;

    let search_radius_km = parse_radius(&or_default("GCMP_SEARCH_RADIUS_KM", "10"))?;
    let search_limit = parse_u32("GCMP_SEARCH_LIMIT", "20")?.min(MAX_SEARCH_LIMIT);
    let store_display_limit = parse_usize("GCMP_STORE_DISPLAY_LIMIT", "6")?;
    let match_policy = parse_match_policy(&or_default("GCMP_MATCH_POLICY", "fallback"))?;

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        snapshot_path,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        search_radius_km,
        search_limit,
        store_display_limit,
        match_policy,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GCMP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_match_policy(s: &str) -> Result<MatchPolicy, ConfigError> {
    match s {
        "fallback" => Ok(MatchPolicy::FallbackToCatalog),
        "strict" => Ok(MatchPolicy::Strict),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GCMP_MATCH_POLICY".to_string(),
            reason: format!("expected 'fallback' or 'strict', got '{other}'"),
        }),
    }
}

/// Parses the search radius, clamping it to [`MAX_SEARCH_RADIUS_KM`].
fn parse_radius(s: &str) -> Result<f64, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "GCMP_SEARCH_RADIUS_KM".to_string(),
        reason,
    };
    let radius = s.parse::<f64>().map_err(|e| invalid(e.to_string()))?;
    if !radius.is_finite() || radius <= 0.0 {
        return Err(invalid(format!("radius must be positive, got {s}")));
    }
    Ok(radius.min(MAX_SEARCH_RADIUS_KM))
}
