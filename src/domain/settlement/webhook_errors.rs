//! Payment webhook error types.
//!
//! The status code is the protocol signal to the payment provider: 2xx means
//! acknowledged, 4xx means "never retry this payload", 5xx means "redeliver".

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signed timestamp is older than the tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Signed timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Signature header or JSON payload could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing from the event object.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Order store failed; the provider should redeliver.
    #[error("Database error: {0}")]
    Database(String),

    /// Quota credit failed after the order was marked settled.
    #[error("Quota credit failed: {0}")]
    CreditFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebhookError {
    /// Returns true if the provider should redeliver this webhook.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::Database(_) | WebhookError::CreditFailed(_) | WebhookError::Internal(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            // Authenticity failures - never retry
            WebhookError::InvalidSignature | WebhookError::TimestampOutOfRange => {
                StatusCode::UNAUTHORIZED
            }

            // Malformed input - never retry
            WebhookError::InvalidTimestamp
            | WebhookError::ParseError(_)
            | WebhookError::MissingField(_) => StatusCode::BAD_REQUEST,

            // Server errors - will retry
            WebhookError::Database(_) | WebhookError::CreditFailed(_) | WebhookError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::DatabaseError => WebhookError::Database(err.message),
            _ => WebhookError::Internal(err.to_string()),
        }
    }
}
