//! Feature flags configuration

use serde::Deserialize;

/// Feature flags for enabling/disabling functionality
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    /// Allow first-time OAuth logins to create accounts
    #[serde(default = "default_registration_enabled")]
    pub registration_enabled: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            registration_enabled: default_registration_enabled(),
        }
    }
}

fn default_registration_enabled() -> bool {
    true
}
