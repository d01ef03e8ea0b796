//! Mock checkout provider for testing.
//!
//! Supports:
//! - Deterministic session ids and URLs
//! - Error injection
//! - Call tracking

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::ports::{CheckoutError, CheckoutProvider, CheckoutRequest, CheckoutSession};

#[derive(Default)]
pub struct MockCheckoutProvider {
    inner: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    next_error: Option<CheckoutError>,
    fail_always: bool,
    requests: Vec<CheckoutRequest>,
}

impl MockCheckoutProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fails the next call with `error`.
    pub fn set_error(&self, error: CheckoutError) {
        self.state().next_error = Some(error);
    }

    /// Fails every call with a network error.
    pub fn failing() -> Self {
        let mock = Self::new();
        mock.state().fail_always = true;
        mock
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CheckoutRequest> {
        self.state().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().requests.len()
    }
}

#[async_trait]
impl CheckoutProvider for MockCheckoutProvider {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError> {
        let mut state = self.state();
        state.requests.push(request.clone());

        if state.fail_always {
            return Err(CheckoutError::network("mock provider unavailable"));
        }
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        let id = format!("cs_test_{}", state.requests.len());
        Ok(CheckoutSession {
            url: format!("https://checkout.stripe.test/pay/{}", id),
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TradeNo;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            trade_no: TradeNo::parse("ref_01").unwrap(),
            quantity: 1,
            customer_id: None,
            customer_email: None,
            success_url: "s".into(),
            cancel_url: "c".into(),
        }
    }

    #[tokio::test]
    async fn records_requests_and_returns_sessions() {
        let mock = MockCheckoutProvider::new();

        let first = mock.create_checkout_session(request()).await.unwrap();
        let second = mock.create_checkout_session(request()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert!(second.url.ends_with(&second.id));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn injected_error_is_returned_once() {
        let mock = MockCheckoutProvider::new();
        mock.set_error(CheckoutError::network("boom"));

        assert!(mock.create_checkout_session(request()).await.is_err());
        assert!(mock.create_checkout_session(request()).await.is_ok());
    }

    #[tokio::test]
    async fn failing_mock_always_fails() {
        let mock = MockCheckoutProvider::failing();
        assert!(mock.create_checkout_session(request()).await.is_err());
        assert!(mock.create_checkout_session(request()).await.is_err());
    }
}
