//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod identity;
pub mod settlement;

pub use identity::{IdentityPolicy, OAuthCallbackCommand, OAuthCallbackHandler, OAuthOutcome};
pub use settlement::{
    CreatePendingOrderCommand, CreatePendingOrderHandler, CreatePendingOrderResult,
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, QuoteTopUpCommand,
    QuoteTopUpHandler, TopUpPolicy, TopUpQuote, WebhookOutcome,
};
