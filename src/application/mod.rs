//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;
mod order_lock;

pub use handlers::{
    // Identity
    IdentityPolicy, OAuthCallbackCommand, OAuthCallbackHandler, OAuthOutcome,
    // Settlement
    CreatePendingOrderCommand, CreatePendingOrderHandler, CreatePendingOrderResult,
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, QuoteTopUpCommand,
    QuoteTopUpHandler, TopUpPolicy, TopUpQuote, WebhookOutcome,
};
pub use order_lock::{OrderGuard, OrderLock};
