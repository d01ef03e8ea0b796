//! Axum router configuration for top-up and webhook endpoints.

use axum::{routing::post, Router};
use tower_http::limit::RequestBodyLimitLayer;

use super::handlers::{
    handle_stripe_webhook, request_amount, request_pay_link, SettlementAppState,
};

/// Largest webhook body accepted.
pub const WEBHOOK_BODY_LIMIT: usize = 64 * 1024;

/// Create the top-up API router.
///
/// # Routes
///
/// ## User Endpoints (require a logged-in session)
/// - `POST /api/user/pay` - Create a pending order, returns the pay link
/// - `POST /api/user/amount` - Quote a top-up
///
/// ## Webhook Endpoints (no session, signature verified)
/// - `POST /api/webhooks/stripe` - Handle Stripe webhooks
pub fn settlement_routes() -> Router<SettlementAppState> {
    top_up_routes().merge(webhook_routes())
}

/// User-facing top-up endpoints.
pub fn top_up_routes() -> Router<SettlementAppState> {
    Router::new()
        .route("/api/user/pay", post(request_pay_link))
        .route("/api/user/amount", post(request_amount))
}

/// Stripe webhook endpoint with its body limit.
pub fn webhook_routes() -> Router<SettlementAppState> {
    Router::new().route(
        "/api/webhooks/stripe",
        post(handle_stripe_webhook).layer(RequestBodyLimitLayer::new(WEBHOOK_BODY_LIMIT)),
    )
}

pub fn settlement_router(state: SettlementAppState) -> Router {
    settlement_routes().with_state(state)
}
