//! Top-up pricing: payment channels, amount bounds, and group ratios.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::SettlementError;

/// Supported payment channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Stripe,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Stripe => "stripe",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = SettlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stripe" => Ok(PaymentMethod::Stripe),
            other => Err(SettlementError::UnsupportedPaymentMethod(other.to_string())),
        }
    }
}

/// Inclusive bounds on a single top-up request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopUpLimits {
    pub min: i64,
    pub max: i64,
}

impl TopUpLimits {
    pub fn check(&self, requested: i64) -> Result<(), SettlementError> {
        if requested < self.min || requested > self.max {
            return Err(self.out_of_range(requested));
        }
        Ok(())
    }

    pub fn out_of_range(&self, requested: i64) -> SettlementError {
        SettlementError::AmountOutOfRange {
            min: self.min,
            max: self.max,
            actual: requested,
        }
    }
}

/// Per-group top-up ratios.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupRatios {
    ratios: HashMap<String, Decimal>,
}

impl GroupRatios {
    pub fn new(ratios: HashMap<String, Decimal>) -> Self {
        Self { ratios }
    }

    /// Ratio for `group`. Missing and zero ratios both mean 1.
    pub fn ratio_for(&self, group: &str) -> Decimal {
        match self.ratios.get(group) {
            Some(ratio) if !ratio.is_zero() => *ratio,
            _ => Decimal::ONE,
        }
    }

    /// Money charged for `requested` units in `group`; `None` on overflow.
    pub fn charged_amount(&self, requested: i64, group: &str) -> Option<Decimal> {
        Decimal::from(requested).checked_mul(self.ratio_for(group))
    }
}

/// Price shown to the user before checkout: `requested × unit_price`.
/// `None` when the product does not fit a `Decimal`.
pub fn pay_amount(requested: i64, unit_price: Decimal) -> Option<Decimal> {
    Decimal::from(requested).checked_mul(unit_price)
}
