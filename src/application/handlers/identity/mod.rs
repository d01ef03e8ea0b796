//! Identity handlers.
//!
//! ## Commands
//! - Completing an OAuth callback (login, registration, or bind)

mod oauth_callback;

pub use oauth_callback::{
    IdentityPolicy, OAuthCallbackCommand, OAuthCallbackHandler, OAuthOutcome,
};
