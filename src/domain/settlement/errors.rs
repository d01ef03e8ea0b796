//! Errors raised while creating pending orders.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("Online payment is disabled")]
    PaymentsDisabled,

    #[error("Unsupported payment method: {0}")]
    UnsupportedPaymentMethod(String),

    #[error("Amount must be between {min} and {max}, got {actual}")]
    AmountOutOfRange { min: i64, max: i64, actual: i64 },

    #[error("Account not found")]
    AccountNotFound,

    /// The provider refused or could not be reached; nothing was stored.
    #[error("Failed to create checkout session: {0}")]
    CheckoutCreationFailed(String),

    /// The provider session exists but the local order does not.
    #[error("Failed to persist order {trade_no}: {reason}")]
    OrderPersistFailed { trade_no: String, reason: String },

    #[error("Store error: {0}")]
    Store(String),
}

impl SettlementError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SettlementError::PaymentsDisabled => StatusCode::FORBIDDEN,
            SettlementError::UnsupportedPaymentMethod(_)
            | SettlementError::AmountOutOfRange { .. } => StatusCode::BAD_REQUEST,
            SettlementError::AccountNotFound => StatusCode::NOT_FOUND,
            SettlementError::CheckoutCreationFailed(_) => StatusCode::BAD_GATEWAY,
            SettlementError::OrderPersistFailed { .. } | SettlementError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DomainError> for SettlementError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::AccountNotFound => SettlementError::AccountNotFound,
            _ => SettlementError::Store(err.to_string()),
        }
    }
}
