//! Stripe Checkout adapter.
//!
//! Implements `CheckoutProvider` with one-off `payment` mode sessions: the
//! configured price times the requested quantity, the trade number as
//! `client_reference_id`.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key, price_id);
//! let adapter = StripeCheckoutAdapter::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::ports::{
    CheckoutError, CheckoutErrorCode, CheckoutProvider, CheckoutRequest, CheckoutSession,
};

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Price charged per top-up unit (price_...).
    price_id: String,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    timeout: Duration,
}

impl StripeConfig {
    pub fn new(api_key: SecretString, price_id: impl Into<String>) -> Self {
        Self {
            api_key,
            price_id: price_id.into(),
            api_base_url: "https://api.stripe.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct StripeCheckoutResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
}

pub struct StripeCheckoutAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeCheckoutAdapter {
    pub fn new(config: StripeConfig) -> Result<Self, CheckoutError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CheckoutError::network(format!("HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Form fields for `POST /v1/checkout/sessions`.
    fn checkout_params(&self, request: &CheckoutRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("mode", "payment".to_string()),
            ("client_reference_id", request.trade_no.to_string()),
            ("line_items[0][price]", self.config.price_id.clone()),
            ("line_items[0][quantity]", request.quantity.to_string()),
            ("success_url", request.success_url.clone()),
            ("cancel_url", request.cancel_url.clone()),
        ];

        match (&request.customer_id, &request.customer_email) {
            (Some(customer), _) => params.push(("customer", customer.clone())),
            (None, Some(email)) => {
                params.push(("customer_email", email.clone()));
                params.push(("customer_creation", "always".to_string()));
            }
            (None, None) => params.push(("customer_creation", "always".to_string())),
        }

        params
    }
}

/// Maps a non-2xx Stripe response body onto a checkout error.
fn provider_error(status: reqwest::StatusCode, body: &str) -> CheckoutError {
    let code = match status.as_u16() {
        401 | 403 => CheckoutErrorCode::AuthenticationError,
        400 | 402 | 404 => CheckoutErrorCode::InvalidRequest,
        _ => CheckoutErrorCode::ProviderError,
    };

    match serde_json::from_str::<StripeErrorBody>(body) {
        Ok(parsed) => {
            let message = parsed
                .error
                .message
                .unwrap_or_else(|| format!("Stripe returned {}", status));
            let err = CheckoutError::new(code, message);
            match parsed.error.code.or(parsed.error.error_type) {
                Some(provider_code) => err.with_provider_code(provider_code),
                None => err,
            }
        }
        Err(_) => CheckoutError::new(code, format!("Stripe returned {}", status)),
    }
}

#[async_trait]
impl CheckoutProvider for StripeCheckoutAdapter {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let params = self.checkout_params(&request);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(trade_no = %request.trade_no, error = %e, "Stripe checkout request failed");
                CheckoutError::network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = provider_error(status, &body);
            tracing::error!(
                trade_no = %request.trade_no,
                %status,
                error = %err,
                "Stripe create_checkout_session failed"
            );
            return Err(err);
        }

        let session: StripeCheckoutResponse = response.json().await.map_err(|e| {
            CheckoutError::new(
                CheckoutErrorCode::ProviderError,
                format!("Failed to parse Stripe response: {}", e),
            )
        })?;

        let url = session.url.ok_or_else(|| {
            CheckoutError::new(CheckoutErrorCode::ProviderError, "Stripe session has no url")
        })?;

        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }
}
