//! Error types for the Ronda engine.
//!
//! The taxonomy separates configuration errors (invalid parameters, reported
//! once and never retried) from dependency failures (a provider that cannot
//! be reached, worth retrying). Data absence is deliberately *not* an error
//! anywhere in the engine: empty result sets and undefined statistics
//! propagate as empty maps and `None` values instead.

use thiserror::Error;

/// The main error type for Ronda operations.
#[derive(Debug, Error)]
pub enum RondaError {
    /// The requested date range has `from` after `to`.
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    /// A date parameter is not a valid ISO-8601 calendar date.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// The target kind is not one of the supported return definitions.
    #[error("Unknown target kind: {0}")]
    UnknownTargetKind(String),

    /// The correlation method is not one of the supported methods.
    #[error("Unknown correlation method: {0}")]
    UnknownMethod(String),

    /// A rolling window of zero was requested.
    #[error("Rolling window must be a positive integer, got {0}")]
    InvalidWindow(usize),

    /// A catalog limit of zero was requested.
    #[error("Catalog limit must be a positive integer, got {0}")]
    InvalidLimit(usize),

    /// A required request parameter was not supplied.
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// The feature name is not registered with any table.
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    /// The instrument is not part of the configured universe.
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    /// A registered table does not satisfy its schema descriptor.
    #[error("Invalid table schema: {0}")]
    InvalidSchema(String),

    /// The trading calendar source is malformed or empty.
    #[error("Calendar error: {0}")]
    Calendar(String),

    /// No base price could be anchored for a rebasing request.
    #[error("Instrument base price not found")]
    BasePriceNotFound,

    /// An external price or feature provider could not be reached.
    #[error("Provider unavailable: {0}")]
    Provider(String),

    /// Error from Polars operations inside the feature store.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// I/O failure reading a data source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON data source could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RondaError {
    /// Whether the error reflects an unavailable dependency rather than a
    /// caller mistake. Retryable errors may succeed on a later attempt
    /// without any change to the request.
    #[must_use]
    pub const fn retryable(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::Io(_))
    }
}

/// A specialized Result type for Ronda operations.
pub type Result<T> = std::result::Result<T, RondaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RondaError::UnknownTargetKind("ret_oc".to_string());
        assert_eq!(err.to_string(), "Unknown target kind: ret_oc");

        let err = RondaError::InvalidWindow(0);
        assert_eq!(
            err.to_string(),
            "Rolling window must be a positive integer, got 0"
        );
    }

    #[test]
    fn test_retryable_split() {
        assert!(RondaError::Provider("feature store offline".into()).retryable());
        assert!(!RondaError::InvalidRange("from after to".into()).retryable());
        assert!(!RondaError::UnknownFeature("vol_20d".into()).retryable());
    }

    #[test]
    fn test_result_type() {
        let ok: Result<i32> = Ok(42);
        assert!(ok.is_ok());
    }
}
