//! In-memory account store for tests and single-process deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::account::{Account, ExternalIdentityId, QuotaCreditEvent};
use crate::domain::foundation::{AccountId, DomainError, ErrorCode};
use crate::ports::AccountStore;

/// Account store backed by hash maps behind one write lock.
///
/// The unique index on external identity ids and the quota balance are
/// both maintained under that lock.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    table: Arc<RwLock<AccountTable>>,
    sequence: AtomicI64,
}

#[derive(Debug, Default)]
struct AccountTable {
    accounts: HashMap<AccountId, Account>,
    by_external_id: HashMap<ExternalIdentityId, AccountId>,
    by_aff_code: HashMap<String, AccountId>,
    quota_log: Vec<QuotaCreditEvent>,
}

impl AccountTable {
    fn check_external_id_free(&self, account: &Account) -> Result<(), DomainError> {
        if let Some(external_id) = &account.external_identity_id {
            if let Some(owner) = self.by_external_id.get(external_id) {
                if *owner != account.id {
                    return Err(DomainError::new(
                        ErrorCode::ExternalIdentityTaken,
                        "external identity already linked",
                    )
                    .with_detail("external_id", external_id.as_str())
                    .with_detail("owner", owner.to_string()));
                }
            }
        }
        Ok(())
    }

    fn check_aff_code_free(&self, account: &Account) -> Result<(), DomainError> {
        match self.by_aff_code.get(&account.aff_code) {
            Some(owner) if *owner != account.id => Err(DomainError::new(
                ErrorCode::AffCodeTaken,
                "affiliate code already in use",
            )
            .with_detail("aff_code", account.aff_code.clone())),
            _ => Ok(()),
        }
    }

    fn index(&mut self, account: &Account) {
        if let Some(external_id) = &account.external_identity_id {
            self.by_external_id.insert(external_id.clone(), account.id);
        }
        if !account.aff_code.is_empty() {
            self.by_aff_code.insert(account.aff_code.clone(), account.id);
        }
    }

    fn unindex(&mut self, account: &Account) {
        if let Some(external_id) = &account.external_identity_id {
            self.by_external_id.remove(external_id);
        }
        self.by_aff_code.remove(&account.aff_code);
    }
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found(id: AccountId) -> DomainError {
        DomainError::new(ErrorCode::AccountNotFound, "account not found")
            .with_detail("account_id", id.to_string())
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, DomainError> {
        Ok(self.table.read().await.accounts.get(&id).cloned())
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalIdentityId,
    ) -> Result<Option<Account>, DomainError> {
        let table = self.table.read().await;
        Ok(table
            .by_external_id
            .get(external_id)
            .and_then(|id| table.accounts.get(id))
            .cloned())
    }

    async fn find_id_by_aff_code(&self, aff_code: &str) -> Result<Option<AccountId>, DomainError> {
        if aff_code.is_empty() {
            return Ok(None);
        }
        Ok(self.table.read().await.by_aff_code.get(aff_code).copied())
    }

    async fn next_account_id(&self) -> Result<AccountId, DomainError> {
        let next = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(AccountId::new(next)?)
    }

    async fn insert(&self, account: &Account) -> Result<(), DomainError> {
        let mut table = self.table.write().await;

        if table.accounts.contains_key(&account.id) {
            return Err(DomainError::new(ErrorCode::DatabaseError, "duplicate account id")
                .with_detail("account_id", account.id.to_string()));
        }
        table.check_external_id_free(account)?;
        table.check_aff_code_free(account)?;

        table.index(account);
        table.accounts.insert(account.id, account.clone());
        self.sequence.fetch_max(account.id.as_i64(), Ordering::SeqCst);
        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), DomainError> {
        let mut table = self.table.write().await;

        let stored = table
            .accounts
            .get(&account.id)
            .cloned()
            .ok_or_else(|| Self::not_found(account.id))?;
        table.check_external_id_free(account)?;
        table.check_aff_code_free(account)?;

        // Balance and customer id have dedicated writers.
        let mut next = account.clone();
        next.quota = stored.quota;
        next.payment_customer_id = stored.payment_customer_id.clone();

        table.unindex(&stored);
        table.index(&next);
        table.accounts.insert(next.id, next);
        Ok(())
    }

    async fn set_payment_customer_id(
        &self,
        id: AccountId,
        customer_id: &str,
    ) -> Result<(), DomainError> {
        let mut table = self.table.write().await;
        let account = table.accounts.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        account.payment_customer_id = Some(customer_id.to_string());
        Ok(())
    }

    async fn credit_quota(&self, event: QuotaCreditEvent) -> Result<i64, DomainError> {
        let mut table = self.table.write().await;

        let account = table
            .accounts
            .get_mut(&event.account_id)
            .ok_or_else(|| Self::not_found(event.account_id))?;
        account.quota = account
            .quota
            .checked_add(event.delta)
            .ok_or_else(|| DomainError::database("quota overflow"))?;
        let balance = account.quota;

        table.quota_log.push(event);
        Ok(balance)
    }

    async fn quota_events(&self, id: AccountId) -> Result<Vec<QuotaCreditEvent>, DomainError> {
        Ok(self
            .table
            .read()
            .await
            .quota_log
            .iter()
            .filter(|event| event.account_id == id)
            .cloned()
            .collect())
    }
}
