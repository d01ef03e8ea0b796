//! Settlement domain module.
//!
//! Top-up orders, their lifecycle, and the payment provider's webhook format.
//!
//! # Module Structure
//!
//! - `order` - SettlementOrder and the OrderStatus state machine
//! - `trade_no` - Trade number derivation
//! - `pricing` - Payment channels, bounds, and group ratios
//! - `stripe_event` - Webhook payload types
//! - `webhook_verifier` - Signature verification
//! - `webhook_errors` / `errors` - Error types

mod errors;
mod order;
mod pricing;
mod stripe_event;
mod trade_no;
mod webhook_errors;
mod webhook_verifier;

pub use errors::SettlementError;
pub use order::{OrderStatus, SettlementOrder};
pub use pricing::{pay_amount, GroupRatios, PaymentMethod, TopUpLimits};
pub use stripe_event::{CheckoutSessionObject, StripeEvent, StripeEventData, StripeEventType};
pub use trade_no::{derive_trade_no, generate_trade_no};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{SignatureHeader, StripeWebhookVerifier, DEFAULT_TOLERANCE_SECS};

#[cfg(test)]
pub(crate) use stripe_event::StripeEventBuilder;
#[cfg(test)]
pub(crate) use webhook_verifier::compute_test_signature_header;
