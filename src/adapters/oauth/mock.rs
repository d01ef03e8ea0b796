//! Mock identity provider for testing.
//!
//! Maps authorization codes to canned profiles. Unknown codes return
//! `InvalidResponse`, the same as a provider rejecting the code.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::account::{ExternalIdentity, ExternalIdentityId, IdentityError};
use crate::ports::IdentityProvider;

#[derive(Debug, Clone)]
struct MockProfile {
    external_id: String,
    name: String,
    trust_level: i32,
}

#[derive(Debug, Default)]
pub struct MockIdentityProvider {
    profiles: HashMap<String, MockProfile>,
    force_error: Option<IdentityError>,
    calls: AtomicUsize,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a profile returned for `code`.
    ///
    /// An empty or `"0"` id is reported as `InvalidResponse`, like a provider
    /// answering with a blank user.
    pub fn with_user(
        mut self,
        code: impl Into<String>,
        external_id: &str,
        name: &str,
        trust_level: i32,
    ) -> Self {
        self.profiles.insert(
            code.into(),
            MockProfile {
                external_id: external_id.to_string(),
                name: name.to_string(),
                trust_level,
            },
        );
        self
    }

    /// Forces every exchange to fail with `error`.
    pub fn with_error(mut self, error: IdentityError) -> Self {
        self.force_error = Some(error);
        self
    }

    /// Number of exchanges attempted.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    fn provider_name(&self) -> &'static str {
        "linuxdo"
    }

    async fn exchange_code_for_profile(
        &self,
        code: &str,
    ) -> Result<ExternalIdentity, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = &self.force_error {
            return Err(error.clone());
        }
        if code.is_empty() {
            return Err(IdentityError::InvalidInput("authorization code is empty".to_string()));
        }

        let profile = self
            .profiles
            .get(code)
            .ok_or_else(|| IdentityError::InvalidResponse("unknown code".to_string()))?;
        let provider_user_id = ExternalIdentityId::new(profile.external_id.as_str())
            .map_err(|_| IdentityError::InvalidResponse("user id is empty".to_string()))?;

        Ok(ExternalIdentity {
            provider_user_id,
            display_name: profile.name.clone(),
            username: profile.name.to_lowercase(),
            trust_level: profile.trust_level,
            active: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_registered_profile() {
        let provider = MockIdentityProvider::new().with_user("code-1", "42", "Alice", 2);

        let identity = provider.exchange_code_for_profile("code-1").await.unwrap();

        assert_eq!(identity.provider_user_id.as_str(), "42");
        assert_eq!(identity.username, "alice");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn zero_id_profile_is_invalid_response() {
        let provider = MockIdentityProvider::new().with_user("code-0", "0", "Nobody", 1);

        let result = provider.exchange_code_for_profile("code-0").await;
        assert!(matches!(result, Err(IdentityError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn forced_error_wins() {
        let provider = MockIdentityProvider::new()
            .with_user("code-1", "42", "Alice", 2)
            .with_error(IdentityError::ProviderUnreachable("down".into()));

        let result = provider.exchange_code_for_profile("code-1").await;
        assert!(matches!(result, Err(IdentityError::ProviderUnreachable(_))));
    }
}
