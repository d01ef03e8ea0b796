//! Axum router configuration for OAuth endpoints.

use axum::{routing::get, Router};

use super::handlers::{issue_state, oauth_bind, oauth_callback, IdentityAppState};

/// Create the OAuth API router.
///
/// # Routes
///
/// - `GET /state` - Issue an OAuth state for the session
/// - `GET /linuxdo` - Provider callback (login, register, or bind)
/// - `GET /linuxdo/bind` - Provider callback, bind only
pub fn identity_routes() -> Router<IdentityAppState> {
    Router::new()
        .route("/state", get(issue_state))
        .route("/linuxdo", get(oauth_callback))
        .route("/linuxdo/bind", get(oauth_bind))
}

/// Router nested under `/api/oauth` with its state applied.
pub fn identity_router(state: IdentityAppState) -> Router {
    Router::new()
        .nest("/api/oauth", identity_routes())
        .with_state(state)
}
