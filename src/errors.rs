/*!
 * Error types for the translate-relay crate.
 *
 * This module contains custom error types for the different layers of the relay,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors reported by a translation backend (vendor endpoint or on-box engine)
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making a request to the backend fails
    #[error("Backend request failed: {0}")]
    RequestFailed(String),

    /// Error returned by the backend itself
    #[error("Backend responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the backend
        message: String,
    },
}

/// Errors raised while building an endpoint configuration.
///
/// These are fatal at startup and never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// The endpoint, weight and language list inputs have different lengths
    #[error(
        "number of endpoints ({endpoints}) must match number of weights ({weights}) and number of language lists ({language_lists})"
    )]
    LengthMismatch {
        endpoints: usize,
        weights: usize,
        language_lists: usize,
    },

    /// No endpoint was configured at all
    #[error("at least one endpoint must be configured")]
    NoEndpoints,

    /// A weight is negative, NaN or infinite
    #[error("invalid weight {weight} for endpoint {endpoint}")]
    InvalidWeight { endpoint: String, weight: f64 },
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// A request names a language code the relay does not serve
    #[error("No matching language code: {0}")]
    UnsupportedLanguage(String),

    /// Neither a direct model nor a pivot through English exists for the pair
    #[error("No translation model available for {from} -> {to}")]
    ModelUnavailable { from: String, to: String },

    /// The backend returned a different number of texts than it was given
    #[error("Backend returned {actual} texts for {expected} inputs")]
    LengthMismatch { expected: usize, actual: usize },

    /// Error from the backend
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from the endpoint configuration
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}
