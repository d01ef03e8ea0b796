//! In-memory session store.
//!
//! Sessions are keyed by a random v4 UUID token. Establishing a login always
//! issues a fresh token instead of upgrading the anonymous one.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::account::{Account, SessionSnapshot};
use crate::domain::foundation::{AccountId, DomainError};
use crate::ports::{SessionEstablisher, SessionStore, SessionToken};

#[derive(Debug, Clone, Default)]
struct SessionRecord {
    oauth_state: Option<String>,
    account_id: Option<AccountId>,
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, SessionRecord>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn new_token() -> SessionToken {
        SessionToken(Uuid::new_v4().simple().to_string())
    }

    /// Opens a session directly, for hosts that authenticate elsewhere.
    pub fn open(&self, oauth_state: Option<String>, account_id: Option<AccountId>) -> SessionToken {
        let token = Self::new_token();
        self.sessions.insert(
            token.0.clone(),
            SessionRecord {
                oauth_state,
                account_id,
            },
        );
        token
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, token: &SessionToken) -> Result<Option<SessionSnapshot>, DomainError> {
        Ok(self.sessions.get(token.as_str()).map(|record| {
            SessionSnapshot::new(record.oauth_state.clone(), record.account_id)
        }))
    }

    async fn store_oauth_state(
        &self,
        token: Option<&SessionToken>,
        state: &str,
    ) -> Result<SessionToken, DomainError> {
        if let Some(token) = token {
            if let Some(mut record) = self.sessions.get_mut(token.as_str()) {
                record.oauth_state = Some(state.to_string());
                return Ok(token.clone());
            }
        }
        Ok(self.open(Some(state.to_string()), None))
    }
}

#[async_trait]
impl SessionEstablisher for InMemorySessionStore {
    async fn establish(&self, account: &Account) -> Result<SessionToken, DomainError> {
        Ok(self.open(None, Some(account.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_token_loads_nothing() {
        let store = InMemorySessionStore::new();
        let loaded = store.load(&SessionToken("nope".into())).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn oauth_state_is_stored_on_new_session() {
        let store = InMemorySessionStore::new();
        let token = store.store_oauth_state(None, "st4te").await.unwrap();

        let snapshot = store.load(&token).await.unwrap().unwrap();
        assert!(snapshot.state_matches("st4te"));
        assert!(snapshot.authenticated_account().is_none());
    }

    #[tokio::test]
    async fn oauth_state_reuses_existing_session() {
        let store = InMemorySessionStore::new();
        let account_id = AccountId::new(4).unwrap();
        let token = store.open(None, Some(account_id));

        let same = store.store_oauth_state(Some(&token), "abc").await.unwrap();
        assert_eq!(same, token);

        let snapshot = store.load(&token).await.unwrap().unwrap();
        assert!(snapshot.state_matches("abc"));
        assert_eq!(
            snapshot.authenticated_account().map(|s| s.account_id()),
            Some(account_id)
        );
    }
}
