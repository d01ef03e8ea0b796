//! External identities and the session-derived account reference.
//!
//! Two identifiers flow through the binding engine: the id the identity
//! provider reports for a user, and the local account id held by the
//! authenticated session. They are separate types so one can never stand in
//! for the other.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{AccountId, ValidationError};

/// Identifier reported by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalIdentityId(String);

impl ExternalIdentityId {
    /// Rejects the empty string and the provider's zero id.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == "0" {
            return Err(ValidationError::empty_field("provider_user_id"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalIdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Profile returned by the identity provider after a code exchange.
///
/// Transient: only its id and trust level are copied onto an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub provider_user_id: ExternalIdentityId,
    pub display_name: String,
    pub username: String,
    pub trust_level: i32,
    pub active: bool,
}

impl ExternalIdentity {
    /// Display name for a new account: profile name, else the handle.
    pub fn preferred_display_name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.username
        } else {
            &self.display_name
        }
    }
}

/// Local account id taken from authenticated session state.
///
/// Has no public constructor. The only way to obtain one is
/// [`SessionSnapshot::authenticated_account`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionAccountId(AccountId);

impl SessionAccountId {
    pub fn account_id(&self) -> AccountId {
        self.0
    }
}

impl fmt::Display for SessionAccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the session middleware knows about the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    oauth_state: Option<String>,
    account: Option<SessionAccountId>,
}

impl SessionSnapshot {
    /// Built by the session layer from the stored cookie.
    pub fn new(oauth_state: Option<String>, account_id: Option<AccountId>) -> Self {
        Self {
            oauth_state,
            account: account_id.map(SessionAccountId),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn oauth_state(&self) -> Option<&str> {
        self.oauth_state.as_deref()
    }

    /// True when `query_state` is non-empty and equals the stored state.
    pub fn state_matches(&self, query_state: &str) -> bool {
        match self.oauth_state.as_deref() {
            Some(stored) => !query_state.is_empty() && stored == query_state,
            None => false,
        }
    }

    pub fn authenticated_account(&self) -> Option<SessionAccountId> {
        self.account
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(display_name: &str, username: &str) -> ExternalIdentity {
        ExternalIdentity {
            provider_user_id: ExternalIdentityId::new("42").unwrap(),
            display_name: display_name.to_string(),
            username: username.to_string(),
            trust_level: 1,
            active: true,
        }
    }

    #[test]
    fn external_id_rejects_zero_and_empty() {
        assert!(ExternalIdentityId::new("").is_err());
        assert!(ExternalIdentityId::new("0").is_err());
        assert!(ExternalIdentityId::new("  ").is_err());
        assert_eq!(ExternalIdentityId::new("1234").unwrap().as_str(), "1234");
    }

    #[test]
    fn display_name_falls_back_to_handle() {
        assert_eq!(identity("Alice", "alice").preferred_display_name(), "Alice");
        assert_eq!(identity("", "alice").preferred_display_name(), "alice");
    }

    #[test]
    fn state_match_requires_stored_and_non_empty_state() {
        let snapshot = SessionSnapshot::new(Some("xyz".to_string()), None);
        assert!(snapshot.state_matches("xyz"));
        assert!(!snapshot.state_matches("abc"));
        assert!(!snapshot.state_matches(""));

        assert!(!SessionSnapshot::anonymous().state_matches("xyz"));
    }

    #[test]
    fn empty_stored_state_never_matches() {
        let snapshot = SessionSnapshot::new(Some(String::new()), None);
        assert!(!snapshot.state_matches(""));
    }

    #[test]
    fn session_account_comes_from_snapshot() {
        let id = AccountId::new(9).unwrap();
        let snapshot = SessionSnapshot::new(None, Some(id));
        assert_eq!(snapshot.authenticated_account().unwrap().account_id(), id);
        assert!(SessionSnapshot::anonymous().authenticated_account().is_none());
    }
}
