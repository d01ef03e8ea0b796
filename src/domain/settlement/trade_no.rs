//! Trade number derivation.
//!
//! `ref_` + hex(SHA-256("<account>-<unix millis>-<salt>")). The salt is a
//! fresh v4 UUID, so numbers cannot be predicted from an account id and time.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::foundation::{AccountId, Timestamp, TradeNo};

/// Derives a trade number from explicit inputs.
pub fn derive_trade_no(account_id: AccountId, unix_millis: i64, salt: &str) -> TradeNo {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}-{}-{}", account_id, unix_millis, salt).as_bytes());
    TradeNo::from_digest(&hex::encode(hasher.finalize()))
}

/// Derives a fresh trade number for `account_id` at the current instant.
pub fn generate_trade_no(account_id: AccountId) -> TradeNo {
    let salt = Uuid::new_v4().simple().to_string();
    derive_trade_no(account_id, Timestamp::now().as_unix_millis(), &salt)
}
