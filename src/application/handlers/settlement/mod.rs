//! Settlement handlers.
//!
//! ## Commands
//! - Creating a pending top-up order with a checkout link
//! - Processing Stripe webhooks
//!
//! ## Queries
//! - Quoting a top-up amount

mod create_pending_order;
mod handle_payment_webhook;
mod quote_top_up;

// Commands
pub use create_pending_order::{
    CreatePendingOrderCommand, CreatePendingOrderHandler, CreatePendingOrderResult, TopUpPolicy,
};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, WebhookOutcome,
};

// Queries
pub use quote_top_up::{QuoteTopUpCommand, QuoteTopUpHandler, TopUpQuote};
