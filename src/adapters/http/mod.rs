//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own HTTP adapter for endpoint exposure;
//! `api_router` merges them behind the session middleware.

pub mod identity;
pub mod middleware;
pub mod settlement;

use std::time::Duration;

use axum::Router;
use tower_http::timeout::TimeoutLayer;

pub use identity::{identity_router, IdentityAppState};
pub use middleware::{session_middleware, CurrentSession, RequireAccount, SessionState};
pub use settlement::{settlement_router, top_up_routes, webhook_routes, SettlementAppState};

/// Full API: OAuth and top-up routes with session cookies resolved.
///
/// `request_timeout` bounds the interactive routes only. Webhook deliveries
/// are left to run; Stripe applies its own deadline and redelivers.
pub fn api_router(
    identity: IdentityAppState,
    settlement: SettlementAppState,
    sessions: SessionState,
    request_timeout: Duration,
) -> Router {
    let interactive = identity_router(identity)
        .merge(top_up_routes().with_state(settlement.clone()))
        .layer(TimeoutLayer::new(request_timeout));

    interactive
        .merge(webhook_routes().with_state(settlement))
        .layer(axum::middleware::from_fn_with_state(sessions, session_middleware))
}
