//! HTTP handlers for OAuth endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::application::{OAuthCallbackCommand, OAuthCallbackHandler};
use crate::domain::account::BindingError;
use crate::ports::SessionStore;

use super::super::middleware::{session_cookie, CurrentSession, RequireAccount};
use super::dto::{LoginData, OAuthCallbackQuery, OAuthResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct IdentityAppState {
    pub sessions: Arc<dyn SessionStore>,
    pub callback_handler: Arc<OAuthCallbackHandler>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/oauth/state - Issue an OAuth state bound to the session
pub async fn issue_state(
    State(state): State<IdentityAppState>,
    current: CurrentSession,
) -> Result<Response, OAuthApiError> {
    let oauth_state = Uuid::new_v4().simple().to_string()[..12].to_string();
    let token = state
        .sessions
        .store_oauth_state(current.token.as_ref(), &oauth_state)
        .await
        .map_err(|e| OAuthApiError(BindingError::Store(e.to_string())))?;

    let mut response = Json(OAuthResponse::ok("", oauth_state)).into_response();
    if let Some(cookie) = session_cookie(&token) {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

/// GET /api/oauth/linuxdo - Login, register, or bind depending on the session
pub async fn oauth_callback(
    State(state): State<IdentityAppState>,
    current: CurrentSession,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Response, OAuthApiError> {
    run_callback(&state, current, query).await
}

/// GET /api/oauth/linuxdo/bind - Bind only; requires a logged-in session
pub async fn oauth_bind(
    State(state): State<IdentityAppState>,
    _account: RequireAccount,
    current: CurrentSession,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Response, OAuthApiError> {
    run_callback(&state, current, query).await
}

async fn run_callback(
    state: &IdentityAppState,
    current: CurrentSession,
    query: OAuthCallbackQuery,
) -> Result<Response, OAuthApiError> {
    let cmd = OAuthCallbackCommand {
        session: current.snapshot,
        query_state: query.state,
        code: query.code,
        aff_code: query.aff,
    };

    let outcome = state.callback_handler.handle(cmd).await?;

    let body = OAuthResponse::ok(
        outcome.message(),
        LoginData {
            id: outcome.account_id().as_i64(),
        },
    );
    let mut response = Json(body).into_response();
    if let Some(cookie) = session_cookie(outcome.session()) {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts binding errors to HTTP responses.
pub struct OAuthApiError(BindingError);

impl From<BindingError> for OAuthApiError {
    fn from(err: BindingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for OAuthApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "OAuth callback failed");
        }
        (status, Json(OAuthResponse::failure(self.0.to_string()))).into_response()
    }
}
