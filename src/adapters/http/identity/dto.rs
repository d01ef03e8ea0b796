//! HTTP DTOs for OAuth endpoints.

use serde::{Deserialize, Serialize};

/// Query string of the provider redirect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthCallbackQuery {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub code: String,
    /// Referral code carried through the login link.
    #[serde(default)]
    pub aff: Option<String>,
}

/// `{success, message, data?}` envelope used by the OAuth endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct OAuthResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> OAuthResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl OAuthResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginData {
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_omits_data() {
        let json = serde_json::to_value(OAuthResponse::failure("nope")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "message": "nope"}));
    }

    #[test]
    fn query_fields_default_to_empty() {
        let query: OAuthCallbackQuery = serde_json::from_str("{}").unwrap();
        assert!(query.state.is_empty());
        assert!(query.aff.is_none());
    }
}
