//! OAuth identity provider configuration (LINUX DO)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::oauth::{DEFAULT_TOKEN_URL, DEFAULT_USER_URL};
use crate::domain::account::TrustLevelGrants;

/// LINUX DO OAuth configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    /// Whether login through the provider is switched on
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub client_id: String,

    #[serde(default = "empty_secret")]
    pub client_secret: SecretString,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default = "default_user_url")]
    pub user_url: String,

    /// Profiles below this trust level are refused
    #[serde(default)]
    pub min_trust_level: i32,

    /// Per-call timeout for token and profile requests, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Quota granted on registration, by trust level
    #[serde(default)]
    pub grant_level_1: i64,
    #[serde(default)]
    pub grant_level_2: i64,
    #[serde(default)]
    pub grant_level_3: i64,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            client_id: String::new(),
            client_secret: empty_secret(),
            token_url: default_token_url(),
            user_url: default_user_url(),
            min_trust_level: 0,
            timeout_secs: default_timeout(),
            grant_level_1: 0,
            grant_level_2: 0,
            grant_level_3: 0,
        }
    }
}

impl OAuthConfig {
    pub fn grants(&self) -> TrustLevelGrants {
        TrustLevelGrants {
            level_1: self.grant_level_1,
            level_2: self.grant_level_2,
            level_3: self.grant_level_3,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate OAuth configuration
    ///
    /// Credentials are only required while the provider is enabled.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.enabled {
            if self.client_id.is_empty() {
                return Err(ValidationError::MissingRequired("OAUTH__CLIENT_ID"));
            }
            if self.client_secret.expose_secret().is_empty() {
                return Err(ValidationError::MissingRequired("OAUTH__CLIENT_SECRET"));
            }
        }
        if !is_http_url(&self.token_url) {
            return Err(ValidationError::InvalidUrl("oauth.token_url"));
        }
        if !is_http_url(&self.user_url) {
            return Err(ValidationError::InvalidUrl("oauth.user_url"));
        }
        if !(0..=4).contains(&self.min_trust_level) {
            return Err(ValidationError::InvalidTrustLevel);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 60 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.grant_level_1 < 0 || self.grant_level_2 < 0 || self.grant_level_3 < 0 {
            return Err(ValidationError::NegativeGrant);
        }
        Ok(())
    }
}

pub(super) fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

pub(super) fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_user_url() -> String {
    DEFAULT_USER_URL.to_string()
}

fn default_timeout() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled() -> OAuthConfig {
        OAuthConfig {
            enabled: true,
            client_id: "client".to_string(),
            client_secret: SecretString::new("secret".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = OAuthConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_enabled_requires_credentials() {
        let config = OAuthConfig {
            enabled: true,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("OAUTH__CLIENT_ID"))
        );

        let config = OAuthConfig {
            client_secret: empty_secret(),
            ..enabled()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("OAUTH__CLIENT_SECRET"))
        );

        assert!(enabled().validate().is_ok());
    }

    #[test]
    fn test_grants_map_by_level() {
        let config = OAuthConfig {
            grant_level_1: 10,
            grant_level_2: 20,
            grant_level_3: 30,
            ..enabled()
        };
        let grants = config.grants();
        assert_eq!(grants.grant_for(2), Some(20));
        assert_eq!(grants.grant_for(0), None);
    }

    #[test]
    fn test_negative_grant_rejected() {
        let config = OAuthConfig {
            grant_level_2: -1,
            ..enabled()
        };
        assert_eq!(config.validate(), Err(ValidationError::NegativeGrant));
    }

    #[test]
    fn test_bad_endpoint_rejected() {
        let config = OAuthConfig {
            user_url: "connect.linux.do/api/user".to_string(),
            ..enabled()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidUrl(_))));
    }
}
