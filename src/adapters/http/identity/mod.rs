//! HTTP adapter for OAuth identity endpoints.
//!
//! - `GET /api/oauth/state` - Issue an OAuth state bound to the session
//! - `GET /api/oauth/linuxdo` - LINUX DO callback
//! - `GET /api/oauth/linuxdo/bind` - LINUX DO callback for binding

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{IdentityAppState, OAuthApiError};
pub use routes::{identity_router, identity_routes};
