use thiserror::Error;

/// Failure kinds surfaced by the comparison engine and its collaborators.
///
/// None of these are fatal to a session: the affected stage keeps its prior
/// result and the error is reported to the shopper through
/// [`EngineError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The search input was empty after trimming.
    #[error("search query is blank")]
    InvalidQuery,

    /// Malformed caller input, e.g. a postal code that is not `A1A 1A1`.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No stores, products, or quotes exist for the given input.
    #[error("not found: {0}")]
    NotFound(String),

    /// A collaborator was unreachable or answered with a non-success status.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl EngineError {
    /// Shopper-facing text for this error.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            EngineError::InvalidQuery => "Enter a product name or brand to search for.",
            EngineError::InvalidInput(_) => {
                "Please provide a valid Canadian postal code (e.g., M5V 3A8)."
            }
            EngineError::NotFound(_) => "Nothing matched your request in your area.",
            EngineError::ServiceUnavailable(_) => {
                "Unable to connect to the service. Please try again."
            }
        }
    }
}

/// Failures loading environment configuration or the snapshot file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read snapshot file {path}: {source}")]
    SnapshotFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse snapshot file: {0}")]
    SnapshotFileParse(#[from] serde_yaml::Error),

    #[error("snapshot validation failed: {0}")]
    Validation(String),
}
