//! Session cookie middleware and extractors.
//!
//! ```text
//! Request → session_middleware → injects CurrentSession into extensions
//!                                       ↓
//!                     Handler → CurrentSession / RequireAccount extractors
//! ```
//!
//! An unknown or missing cookie yields an anonymous session; only a store
//! failure stops the request.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::account::{SessionAccountId, SessionSnapshot};
use crate::ports::{SessionStore, SessionToken};

pub const SESSION_COOKIE: &str = "session";

/// Session middleware state.
pub type SessionState = Arc<dyn SessionStore>;

/// The caller's session as loaded from the cookie.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    pub token: Option<SessionToken>,
    pub snapshot: SessionSnapshot,
}

pub async fn session_middleware(
    State(sessions): State<SessionState>,
    mut request: Request,
    next: Next,
) -> Response {
    let current = match session_token(request.headers()) {
        Some(token) => match sessions.load(&token).await {
            Ok(Some(snapshot)) => CurrentSession {
                token: Some(token),
                snapshot,
            },
            Ok(None) => CurrentSession::default(),
            Err(e) => {
                tracing::error!(error = %e, "session store unavailable");
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(serde_json::json!({
                        "success": false,
                        "message": "Session store unavailable"
                    })),
                )
                    .into_response();
            }
        },
        None => CurrentSession::default(),
    };

    request.extensions_mut().insert(current);
    next.run(request).await
}

/// Reads the session token from the `Cookie` header.
pub fn session_token(headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| SessionToken(value.to_string()))
}

/// `Set-Cookie` value carrying `token`.
pub fn session_cookie(token: &SessionToken) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE,
        token.as_str()
    ))
    .ok()
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Extractor that requires a logged-in session.
#[derive(Debug, Clone, Copy)]
pub struct RequireAccount(pub SessionAccountId);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAccount
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .and_then(|current| current.snapshot.authenticated_account())
            .map(RequireAccount)
            .ok_or(SessionRejection::Unauthenticated)
    }
}

/// Rejection type for session failures.
#[derive(Debug, Clone)]
pub enum SessionRejection {
    Unauthenticated,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        let message = match self {
            SessionRejection::Unauthenticated => "Authentication required",
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "success": false,
                "message": message
            })),
        )
            .into_response()
    }
}
