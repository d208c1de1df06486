use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// What the catalog matcher returns when nothing matches the query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Return the whole catalog so the shopper still sees something.
    #[default]
    FallbackToCatalog,
    /// Return an empty result and let the caller render "no results".
    Strict,
}

impl std::fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchPolicy::FallbackToCatalog => write!(f, "fallback"),
            MatchPolicy::Strict => write!(f, "strict"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Base URL of the grocery price API. `None` selects the offline snapshot.
    pub api_base_url: Option<String>,
    pub snapshot_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub search_radius_km: f64,
    pub search_limit: u32,
    pub store_display_limit: usize,
    pub match_policy: MatchPolicy,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("api_base_url", &self.api_base_url)
            .field("snapshot_path", &self.snapshot_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("search_radius_km", &self.search_radius_km)
            .field("search_limit", &self.search_limit)
            .field("store_display_limit", &self.store_display_limit)
            .field("match_policy", &self.match_policy)
            .finish()
    }
}
