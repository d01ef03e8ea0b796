//! Account store port.
//!
//! Persistent record store for accounts and their quota log.
//!
//! # Contract
//!
//! - `external_identity_id` is unique across accounts; `insert` and `update`
//!   fail with `ErrorCode::ExternalIdentityTaken` when it would be duplicated
//! - `aff_code` is unique; a duplicate fails with `ErrorCode::AffCodeTaken`
//! - `update` writes profile and linkage fields only, never `quota` or
//!   `payment_customer_id`
//! - `credit_quota` adds to the balance and appends the log entry atomically,
//!   so concurrent credits never lose an update

use async_trait::async_trait;

use crate::domain::account::{Account, ExternalIdentityId, QuotaCreditEvent};
use crate::domain::foundation::{AccountId, DomainError};

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, DomainError>;

    async fn find_by_external_id(
        &self,
        external_id: &ExternalIdentityId,
    ) -> Result<Option<Account>, DomainError>;

    /// Resolves a referral code to its owner.
    async fn find_id_by_aff_code(&self, aff_code: &str) -> Result<Option<AccountId>, DomainError>;

    /// Reserves the next account id from an atomic sequence.
    ///
    /// Ids are never reused, even when the reserving insert fails.
    async fn next_account_id(&self) -> Result<AccountId, DomainError>;

    async fn insert(&self, account: &Account) -> Result<(), DomainError>;

    /// Fails with `ErrorCode::AccountNotFound` for unknown ids.
    async fn update(&self, account: &Account) -> Result<(), DomainError>;

    /// Stores the payment provider's customer id for later checkouts.
    async fn set_payment_customer_id(
        &self,
        id: AccountId,
        customer_id: &str,
    ) -> Result<(), DomainError>;

    /// Applies `event.delta` to the balance and appends `event` to the log.
    ///
    /// Returns the new balance.
    async fn credit_quota(&self, event: QuotaCreditEvent) -> Result<i64, DomainError>;

    /// Credit log for one account, oldest first.
    async fn quota_events(&self, id: AccountId) -> Result<Vec<QuotaCreditEvent>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn AccountStore) {}
        fn _assert_send_sync<T: Send + Sync>() {}
        _assert_send_sync::<std::sync::Arc<dyn AccountStore>>();
    }
}
