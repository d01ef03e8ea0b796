//! HTTP adapter for top-up endpoints.
//!
//! - `POST /api/user/pay` - Create a pending order with a Stripe checkout link
//! - `POST /api/user/amount` - Quote a top-up amount
//! - `POST /api/webhooks/stripe` - Handle Stripe webhooks

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{SettlementAppState, TopUpApiError, WebhookApiError};
pub use routes::{
    settlement_router, settlement_routes, top_up_routes, webhook_routes, WEBHOOK_BODY_LIMIT,
};
