//! Stripe payment provider adapter.
//!
//! Implements the `CheckoutProvider` port with Stripe Checkout. Webhook
//! signature verification lives in the settlement domain.
//!
//! # Security
//!
//! - The API key is held as `secrecy::SecretString` and only exposed for
//!   HTTP basic auth

mod mock_checkout_provider;
mod stripe_adapter;

pub use mock_checkout_provider::MockCheckoutProvider;
pub use stripe_adapter::{StripeCheckoutAdapter, StripeConfig};
