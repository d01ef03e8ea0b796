//! Session ports.
//!
//! `SessionStore` backs the HTTP session cookie. `SessionEstablisher` is the
//! narrow capability the binding engine uses once a login has succeeded.

use async_trait::async_trait;

use crate::domain::account::{Account, SessionSnapshot};
use crate::domain::foundation::DomainError;

/// Opaque session token handed to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(pub String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Snapshot for `token`, `None` if unknown.
    async fn load(&self, token: &SessionToken) -> Result<Option<SessionSnapshot>, DomainError>;

    /// Stores a fresh OAuth state on the session, creating one if needed.
    ///
    /// Returns the session token that now holds `state`.
    async fn store_oauth_state(
        &self,
        token: Option<&SessionToken>,
        state: &str,
    ) -> Result<SessionToken, DomainError>;
}

#[async_trait]
pub trait SessionEstablisher: Send + Sync {
    /// Opens an authenticated session for `account`.
    async fn establish(&self, account: &Account) -> Result<SessionToken, DomainError>;
}
