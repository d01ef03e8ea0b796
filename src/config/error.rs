//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid URL for {0}")]
    InvalidUrl(&'static str),

    #[error("Invalid Stripe API key format")]
    InvalidStripeKey,

    #[error("Invalid Stripe webhook secret format")]
    InvalidStripeWebhookSecret,

    #[error("Top-up bounds must satisfy 1 <= min <= max")]
    InvalidTopUpRange,

    #[error("Unit price must be positive")]
    InvalidUnitPrice,

    #[error("Quota per unit must be positive")]
    InvalidQuotaPerUnit,

    #[error("Invalid group ratios: {0}")]
    InvalidGroupRatios(String),

    #[error("Registration grants must not be negative")]
    NegativeGrant,

    #[error("Minimum trust level must be between 0 and 4")]
    InvalidTrustLevel,
}
