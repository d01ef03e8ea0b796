//! Checkout provider port for hosted payment pages.
//!
//! One operation: open a provider-hosted checkout session for a top-up and
//! return its URL. The trade number travels as the session's client
//! reference and comes back in the webhook.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::TradeNo;

#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError>;
}

/// Request for a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Correlation key returned as `client_reference_id`.
    pub trade_no: TradeNo,

    /// Number of priced units.
    pub quantity: i64,

    /// Existing provider customer, reused when known.
    pub customer_id: Option<String>,

    /// Used to create a customer when `customer_id` is absent.
    pub customer_email: Option<String>,

    pub success_url: String,
    pub cancel_url: String,
}

/// Checkout session returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session id (cs_xxx).
    pub id: String,

    /// URL the user is redirected to.
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutErrorCode {
    NetworkError,
    AuthenticationError,
    InvalidRequest,
    ProviderError,
}

impl fmt::Display for CheckoutErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckoutErrorCode::NetworkError => "network_error",
            CheckoutErrorCode::AuthenticationError => "authentication_error",
            CheckoutErrorCode::InvalidRequest => "invalid_request",
            CheckoutErrorCode::ProviderError => "provider_error",
        };
        f.write_str(s)
    }
}

/// Error from the checkout provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutError {
    pub code: CheckoutErrorCode,
    pub message: String,

    /// Provider's own error code, if it sent one.
    pub provider_code: Option<String>,
}

impl CheckoutError {
    pub fn new(code: CheckoutErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(CheckoutErrorCode::NetworkError, message)
    }
}

impl fmt::Display for CheckoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CheckoutError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_provider_is_object_safe() {
        fn _accepts_dyn(_provider: &dyn CheckoutProvider) {}
        fn _assert_send_sync<T: Send + Sync>() {}
        _assert_send_sync::<std::sync::Arc<dyn CheckoutProvider>>();
    }

    #[test]
    fn error_displays_code_and_message() {
        let err = CheckoutError::network("connection reset").with_provider_code("api_error");
        assert_eq!(err.to_string(), "network_error: connection reset");
        assert_eq!(err.provider_code.as_deref(), Some("api_error"));
    }
}
