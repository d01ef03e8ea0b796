//! Errors raised by the identity provider client and the binding engine.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | InvalidInput | 400 |
//! | InsufficientTrust | 403 |
//! | ProviderUnreachable / InvalidResponse | 502 |
//! | StateMismatch / OAuthDisabled / RegistrationDisabled / AccountDisabled | 403 |
//! | AlreadyLinked | 409 |
//! | AccountNotFound | 404 |
//! | Store | 500 |

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Failures of a single code exchange with the identity provider.
///
/// Never retried: authorization codes are single-use.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Identity provider unreachable: {0}")]
    ProviderUnreachable(String),

    #[error("Invalid response from identity provider: {0}")]
    InvalidResponse(String),

    #[error("Trust level {actual} is below the required minimum {required}")]
    InsufficientTrust { actual: i32, required: i32 },
}

impl IdentityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            IdentityError::InsufficientTrust { .. } => StatusCode::FORBIDDEN,
            IdentityError::ProviderUnreachable(_) | IdentityError::InvalidResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

/// Failures of the login, register, and bind flows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("OAuth state mismatch")]
    StateMismatch,

    #[error("Login through the identity provider is disabled")]
    OAuthDisabled,

    #[error("This external account is already bound to another user")]
    AlreadyLinked,

    #[error("New user registration is disabled")]
    RegistrationDisabled,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Account not found")]
    AccountNotFound,

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("Account store error: {0}")]
    Store(String),
}

impl BindingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BindingError::StateMismatch
            | BindingError::OAuthDisabled
            | BindingError::RegistrationDisabled
            | BindingError::AccountDisabled => StatusCode::FORBIDDEN,
            BindingError::AlreadyLinked => StatusCode::CONFLICT,
            BindingError::AccountNotFound => StatusCode::NOT_FOUND,
            BindingError::Identity(err) => err.status_code(),
            BindingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for BindingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::AccountNotFound => BindingError::AccountNotFound,
            ErrorCode::ExternalIdentityTaken => BindingError::AlreadyLinked,
            _ => BindingError::Store(err.to_string()),
        }
    }
}
