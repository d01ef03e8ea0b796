//! LINUX DO OAuth identity provider.
//!
//! Authorization-code flow against connect.linux.do: a form-encoded token
//! exchange with HTTP basic client credentials, then a bearer-token profile
//! fetch. Each call has its own timeout and neither is retried.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::account::{ExternalIdentity, ExternalIdentityId, IdentityError};
use crate::ports::IdentityProvider;

pub const DEFAULT_TOKEN_URL: &str = "https://connect.linux.do/oauth2/token";
pub const DEFAULT_USER_URL: &str = "https://connect.linux.do/api/user";

/// Connection settings for the LINUX DO provider.
#[derive(Debug, Clone)]
pub struct LinuxDoConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub token_url: String,
    pub user_url: String,
    pub min_trust_level: i32,
    pub timeout: Duration,
}

impl LinuxDoConfig {
    pub fn new(client_id: impl Into<String>, client_secret: SecretString) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            user_url: DEFAULT_USER_URL.to_string(),
            min_trust_level: 0,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_endpoints(mut self, token_url: impl Into<String>, user_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self.user_url = user_url.into();
        self
    }

    pub fn with_min_trust_level(mut self, level: i32) -> Self {
        self.min_trust_level = level;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

/// Profile as returned by `/api/user`.
#[derive(Debug, Deserialize)]
struct LinuxDoUser {
    #[serde(default)]
    id: i64,
    #[serde(default)]
    username: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    trust_level: i32,
}

pub struct LinuxDoIdentityProvider {
    config: LinuxDoConfig,
    http_client: reqwest::Client,
}

impl LinuxDoIdentityProvider {
    pub fn new(config: LinuxDoConfig) -> Result<Self, IdentityError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| IdentityError::ProviderUnreachable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    async fn exchange_code(&self, code: &str) -> Result<String, IdentityError> {
        let params = [("grant_type", "authorization_code"), ("code", code)];

        let response = self
            .http_client
            .post(&self.config.token_url)
            .basic_auth(
                &self.config.client_id,
                Some(self.config.client_secret.expose_secret()),
            )
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "LINUX DO token exchange failed");
                IdentityError::ProviderUnreachable(e.to_string())
            })?;

        let status = response.status();
        if status.is_server_error() {
            tracing::error!(%status, "LINUX DO token endpoint error");
            return Err(IdentityError::ProviderUnreachable(format!(
                "token endpoint returned {}",
                status
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, %status, "undecodable LINUX DO token response");
            IdentityError::InvalidResponse(format!("token response: {}", e))
        })?;

        if token.access_token.is_empty() {
            return Err(IdentityError::InvalidResponse(format!(
                "no access token (status {})",
                status
            )));
        }
        Ok(token.access_token)
    }

    async fn fetch_user(&self, access_token: &str) -> Result<LinuxDoUser, IdentityError> {
        let response = self
            .http_client
            .get(&self.config.user_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "LINUX DO profile fetch failed");
                IdentityError::ProviderUnreachable(e.to_string())
            })?;

        let status = response.status();
        if status.is_server_error() {
            tracing::error!(%status, "LINUX DO user endpoint error");
            return Err(IdentityError::ProviderUnreachable(format!(
                "user endpoint returned {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            tracing::warn!(error = %e, %status, "undecodable LINUX DO profile");
            IdentityError::InvalidResponse(format!("profile: {}", e))
        })
    }
}

/// Maps a fetched profile onto the domain, enforcing id and trust rules.
fn to_identity(user: LinuxDoUser, min_trust_level: i32) -> Result<ExternalIdentity, IdentityError> {
    let provider_user_id = ExternalIdentityId::new(user.id.to_string())
        .map_err(|_| IdentityError::InvalidResponse("user id is empty".to_string()))?;

    if user.trust_level < min_trust_level {
        return Err(IdentityError::InsufficientTrust {
            actual: user.trust_level,
            required: min_trust_level,
        });
    }

    Ok(ExternalIdentity {
        provider_user_id,
        display_name: user.name.unwrap_or_default(),
        username: user.username,
        trust_level: user.trust_level,
        active: user.active,
    })
}

#[async_trait]
impl IdentityProvider for LinuxDoIdentityProvider {
    fn provider_name(&self) -> &'static str {
        "linuxdo"
    }

    async fn exchange_code_for_profile(
        &self,
        code: &str,
    ) -> Result<ExternalIdentity, IdentityError> {
        if code.is_empty() {
            return Err(IdentityError::InvalidInput("authorization code is empty".to_string()));
        }

        let access_token = self.exchange_code(code).await?;
        let user = self.fetch_user(&access_token).await?;
        let identity = to_identity(user, self.config.min_trust_level)?;

        tracing::debug!(
            external_id = %identity.provider_user_id,
            trust_level = identity.trust_level,
            "LINUX DO profile resolved"
        );
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, trust_level: i32) -> LinuxDoUser {
        LinuxDoUser {
            id,
            username: "neo".to_string(),
            name: Some("Thomas".to_string()),
            active: true,
            trust_level,
        }
    }

    fn unreachable_provider() -> LinuxDoIdentityProvider {
        // Port 9 (discard) on loopback refuses connections.
        let config = LinuxDoConfig::new("client", SecretString::new("secret".into()))
            .with_endpoints("http://127.0.0.1:9/token", "http://127.0.0.1:9/user")
            .with_timeout(Duration::from_millis(500));
        LinuxDoIdentityProvider::new(config).unwrap()
    }

    #[test]
    fn profile_maps_to_identity() {
        let identity = to_identity(user(1234, 2), 1).unwrap();

        assert_eq!(identity.provider_user_id.as_str(), "1234");
        assert_eq!(identity.display_name, "Thomas");
        assert_eq!(identity.username, "neo");
        assert_eq!(identity.trust_level, 2);
    }

    #[test]
    fn zero_id_is_invalid_response() {
        assert!(matches!(
            to_identity(user(0, 3), 0),
            Err(IdentityError::InvalidResponse(_))
        ));
    }

    #[test]
    fn low_trust_is_rejected() {
        assert_eq!(
            to_identity(user(5, 0), 1).unwrap_err(),
            IdentityError::InsufficientTrust {
                actual: 0,
                required: 1
            }
        );
    }

    #[test]
    fn missing_fields_decode_to_defaults() {
        let user: LinuxDoUser = serde_json::from_str(r#"{"username":"x"}"#).unwrap();
        assert_eq!(user.id, 0);
        assert!(matches!(
            to_identity(user, 0),
            Err(IdentityError::InvalidResponse(_))
        ));
    }

    #[test]
    fn defaults_point_at_linuxdo() {
        let config = LinuxDoConfig::new("id", SecretString::new("secret".into()));
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.user_url, DEFAULT_USER_URL);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn empty_code_is_invalid_input() {
        let result = unreachable_provider().exchange_code_for_profile("").await;
        assert!(matches!(result, Err(IdentityError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn connection_failure_is_provider_unreachable() {
        let result = unreachable_provider()
            .exchange_code_for_profile("abc")
            .await;
        assert!(matches!(result, Err(IdentityError::ProviderUnreachable(_))));
    }
}
