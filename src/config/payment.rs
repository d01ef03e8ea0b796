//! Payment configuration (Stripe top-ups)

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::HashMap;

use super::error::ValidationError;
use super::oauth::{empty_secret, is_http_url};
use crate::domain::settlement::{GroupRatios, TopUpLimits, DEFAULT_TOLERANCE_SECS};

/// Payment configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Global switch for online payment
    #[serde(default)]
    pub enabled: bool,

    /// Stripe API key
    #[serde(default = "empty_secret")]
    pub stripe_api_key: SecretString,

    /// Stripe webhook signing secret
    #[serde(default = "empty_secret")]
    pub stripe_webhook_secret: SecretString,

    /// Stripe price charged per top-up unit
    #[serde(default)]
    pub stripe_price_id: String,

    /// Public base URL used for checkout return links
    #[serde(default = "default_server_address")]
    pub server_address: String,

    #[serde(default = "default_min_top_up")]
    pub min_top_up: i64,

    #[serde(default = "default_max_top_up")]
    pub max_top_up: i64,

    /// Price of one unit shown in quotes
    #[serde(default = "default_unit_price")]
    pub unit_price: Decimal,

    /// Quota credited per purchased unit
    #[serde(default = "default_quota_per_unit")]
    pub quota_per_unit: i64,

    /// JSON object of group name to top-up ratio, e.g. `{"vip": 0.8}`
    #[serde(default = "default_group_ratios")]
    pub group_ratios: String,

    #[serde(default = "default_tolerance")]
    pub webhook_tolerance_secs: i64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            stripe_api_key: empty_secret(),
            stripe_webhook_secret: empty_secret(),
            stripe_price_id: String::new(),
            server_address: default_server_address(),
            min_top_up: default_min_top_up(),
            max_top_up: default_max_top_up(),
            unit_price: default_unit_price(),
            quota_per_unit: default_quota_per_unit(),
            group_ratios: default_group_ratios(),
            webhook_tolerance_secs: default_tolerance(),
        }
    }
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_test_")
    }

    pub fn limits(&self) -> TopUpLimits {
        TopUpLimits {
            min: self.min_top_up,
            max: self.max_top_up,
        }
    }

    /// Parses `group_ratios`. Values may be JSON numbers or numeric strings.
    pub fn parsed_group_ratios(&self) -> Result<GroupRatios, ValidationError> {
        let raw: HashMap<String, serde_json::Value> = serde_json::from_str(&self.group_ratios)
            .map_err(|e| ValidationError::InvalidGroupRatios(e.to_string()))?;

        let mut ratios = HashMap::with_capacity(raw.len());
        for (group, value) in raw {
            let text = match &value {
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::String(s) => s.clone(),
                _ => {
                    return Err(ValidationError::InvalidGroupRatios(format!(
                        "ratio for {} is not a number",
                        group
                    )))
                }
            };
            let ratio: Decimal = text.parse().map_err(|_| {
                ValidationError::InvalidGroupRatios(format!("ratio for {} is not a number", group))
            })?;
            if ratio.is_sign_negative() {
                return Err(ValidationError::InvalidGroupRatios(format!(
                    "ratio for {} is negative",
                    group
                )));
            }
            ratios.insert(group, ratio);
        }
        Ok(GroupRatios::new(ratios))
    }

    /// Validate payment configuration
    ///
    /// Stripe credentials are only required while payments are enabled.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.enabled {
            let api_key = self.stripe_api_key.expose_secret();
            let webhook_secret = self.stripe_webhook_secret.expose_secret();
            if api_key.is_empty() {
                return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_API_KEY"));
            }
            if webhook_secret.is_empty() {
                return Err(ValidationError::MissingRequired(
                    "PAYMENT__STRIPE_WEBHOOK_SECRET",
                ));
            }
            if self.stripe_price_id.is_empty() {
                return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_PRICE_ID"));
            }

            // Verify key prefixes for safety
            if !api_key.starts_with("sk_") {
                return Err(ValidationError::InvalidStripeKey);
            }
            if !webhook_secret.starts_with("whsec_") {
                return Err(ValidationError::InvalidStripeWebhookSecret);
            }
        }

        if !is_http_url(&self.server_address) {
            return Err(ValidationError::InvalidUrl("payment.server_address"));
        }
        if self.min_top_up < 1 || self.min_top_up > self.max_top_up {
            return Err(ValidationError::InvalidTopUpRange);
        }
        if self.unit_price <= Decimal::ZERO {
            return Err(ValidationError::InvalidUnitPrice);
        }
        if self.quota_per_unit < 1 {
            return Err(ValidationError::InvalidQuotaPerUnit);
        }
        if self.webhook_tolerance_secs <= 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        self.parsed_group_ratios()?;
        Ok(())
    }
}

fn default_server_address() -> String {
    "http://localhost:3000".to_string()
}

fn default_min_top_up() -> i64 {
    1
}

fn default_max_top_up() -> i64 {
    10000
}

fn default_unit_price() -> Decimal {
    Decimal::new(80, 1)
}

fn default_quota_per_unit() -> i64 {
    1
}

fn default_group_ratios() -> String {
    "{}".to_string()
}

fn default_tolerance() -> i64 {
    DEFAULT_TOLERANCE_SECS
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn enabled() -> PaymentConfig {
        PaymentConfig {
            enabled: true,
            stripe_api_key: SecretString::new("sk_test_abcd1234".to_string()),
            stripe_webhook_secret: SecretString::new("whsec_xyz789".to_string()),
            stripe_price_id: "price_unit".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_are_valid_when_disabled() {
        let config = PaymentConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.limits(), TopUpLimits { min: 1, max: 10000 });
        assert_eq!(config.unit_price, dec!(8.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_is_test_mode() {
        assert!(enabled().is_test_mode());
    }

    #[test]
    fn test_validation_missing_api_key() {
        let config = PaymentConfig {
            stripe_api_key: empty_secret(),
            ..enabled()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("PAYMENT__STRIPE_API_KEY"))
        );
    }

    #[test]
    fn test_validation_invalid_api_key_prefix() {
        let config = PaymentConfig {
            stripe_api_key: SecretString::new("pk_test_xxx".to_string()), // Wrong prefix
            ..enabled()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidStripeKey));
    }

    #[test]
    fn test_validation_invalid_webhook_secret_prefix() {
        let config = PaymentConfig {
            stripe_webhook_secret: SecretString::new("secret_xxx".to_string()), // Wrong prefix
            ..enabled()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidStripeWebhookSecret)
        );
    }

    #[test]
    fn test_validation_top_up_range() {
        let config = PaymentConfig {
            min_top_up: 100,
            max_top_up: 10,
            ..enabled()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTopUpRange));
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(enabled().validate().is_ok());
    }

    #[test]
    fn test_group_ratios_accept_numbers_and_strings() {
        let config = PaymentConfig {
            group_ratios: r#"{"vip": 0.8, "svip": "0.5", "free": 0}"#.to_string(),
            ..enabled()
        };
        let ratios = config.parsed_group_ratios().unwrap();
        assert_eq!(ratios.ratio_for("vip"), dec!(0.8));
        assert_eq!(ratios.ratio_for("svip"), dec!(0.5));
        assert_eq!(ratios.ratio_for("free"), Decimal::ONE);
        assert_eq!(ratios.ratio_for("default"), Decimal::ONE);
    }

    #[test]
    fn test_group_ratios_reject_garbage() {
        let config = PaymentConfig {
            group_ratios: r#"{"vip": true}"#.to_string(),
            ..enabled()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidGroupRatios(_))
        ));

        let config = PaymentConfig {
            group_ratios: "not json".to_string(),
            ..enabled()
        };
        assert!(config.parsed_group_ratios().is_err());
    }
}
