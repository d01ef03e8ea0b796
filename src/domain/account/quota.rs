//! Quota credit log entries and the registration grant table.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccountId, Timestamp, TradeNo};

/// Why quota was credited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuotaReason {
    /// Welcome credit for registering through the identity provider.
    RegistrationGrant { trust_level: i32 },

    /// Settled top-up order.
    TopUp { trade_no: TradeNo },
}

/// Append-only record of a quota change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaCreditEvent {
    pub account_id: AccountId,
    pub delta: i64,
    pub reason: QuotaReason,
    pub occurred_at: Timestamp,
}

impl QuotaCreditEvent {
    pub fn new(account_id: AccountId, delta: i64, reason: QuotaReason) -> Self {
        Self {
            account_id,
            delta,
            reason,
            occurred_at: Timestamp::now(),
        }
    }
}

/// Initial credit per trust level for newly registered accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrustLevelGrants {
    pub level_1: i64,
    pub level_2: i64,
    pub level_3: i64,
}

impl TrustLevelGrants {
    /// Amount for a recognised level; `None` for level 0 and anything unlisted.
    pub fn grant_for(&self, trust_level: i32) -> Option<i64> {
        match trust_level {
            1 => Some(self.level_1),
            2 => Some(self.level_2),
            3 => Some(self.level_3),
            _ => None,
        }
    }
}
