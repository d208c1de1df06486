use gcmp_core::EngineError;
use thiserror::Error;

/// Errors returned by the grocery price API client.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// HTTP 400. `message` is the API's own explanation when it sent one.
    #[error("request rejected by {url}: {message}")]
    BadRequest { url: String, message: String },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("rate limited by {url}")]
    RateLimited { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl From<SourceError> for EngineError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::BadRequest { message, .. } => EngineError::InvalidInput(message),
            SourceError::NotFound { url } => EngineError::NotFound(url),
            other @ (SourceError::Http(_)
            | SourceError::Deserialize { .. }
            | SourceError::RateLimited { .. }
            | SourceError::UnexpectedStatus { .. }
            | SourceError::InvalidBaseUrl { .. }) => {
                EngineError::ServiceUnavailable(other.to_string())
            }
        }
    }
}
