//! Account aggregate.
//!
//! # Invariants
//!
//! - `external_identity_id`, when present, belongs to at most one account
//!   (enforced by the account store)
//! - `quota` only changes through the store's atomic credit operation

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccountId, Timestamp};

use super::{ExternalIdentity, ExternalIdentityId};

/// Group used when an account has none configured.
pub const DEFAULT_GROUP: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    CommonUser,
    Admin,
    Root,
}

/// A local platform account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub status: AccountStatus,

    /// Prepaid balance in quota units.
    pub quota: i64,

    /// Pricing group, selects the top-up ratio.
    pub group: String,

    pub email: Option<String>,

    /// Referral code other users can register with.
    pub aff_code: String,

    pub inviter_id: Option<AccountId>,

    pub external_identity_id: Option<ExternalIdentityId>,
    pub external_trust_level: i32,

    /// Customer record at the payment provider, reused across checkouts.
    pub payment_customer_id: Option<String>,

    pub created_at: Timestamp,
}

impl Account {
    /// A fresh enabled account registered through an external identity.
    pub fn register(
        id: AccountId,
        username: String,
        identity: &ExternalIdentity,
        aff_code: String,
        inviter_id: Option<AccountId>,
    ) -> Self {
        Self {
            id,
            username,
            display_name: identity.preferred_display_name().to_string(),
            role: Role::CommonUser,
            status: AccountStatus::Enabled,
            quota: 0,
            group: DEFAULT_GROUP.to_string(),
            email: None,
            aff_code,
            inviter_id,
            external_identity_id: Some(identity.provider_user_id.clone()),
            external_trust_level: identity.trust_level,
            payment_customer_id: None,
            created_at: Timestamp::now(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.status == AccountStatus::Enabled
    }

    pub fn is_linked_to(&self, external_id: &ExternalIdentityId) -> bool {
        self.external_identity_id.as_ref() == Some(external_id)
    }

    /// Attaches the external id and its current trust level.
    pub fn link_external_identity(&mut self, identity: &ExternalIdentity) {
        self.external_identity_id = Some(identity.provider_user_id.clone());
        self.external_trust_level = identity.trust_level;
    }

    pub fn refresh_trust_level(&mut self, trust_level: i32) {
        self.external_trust_level = trust_level;
    }
}
