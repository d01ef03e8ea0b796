//! HTTP middleware for axum.
//!
//! This module contains middleware layers for cross-cutting concerns:
//!
//! - `session` - Session cookie middleware and extractors

pub mod session;

pub use session::{
    session_cookie, session_middleware, CurrentSession, RequireAccount, SessionRejection,
    SessionState, SESSION_COOKIE,
};
