//! Error types for keyword-density-core.

use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors reported by the primary-keyword validator.
///
/// Analysis itself never fails; the only miss is a category lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The category has no primary keyword in the built-in or custom map.
    #[error("{category} has no configured primary keyword (available: {available})")]
    UnconfiguredCategory {
        /// The category that was requested.
        category: String,
        /// Comma-separated list of configured categories.
        available: String,
    },
}

/// Result type alias using [`ValidationError`].
pub type ValidationResult<T> = Result<T, ValidationError>;
