//! OAuthCallbackHandler - login, registration, and binding through an
//! external identity provider.
//!
//! The local account for a bind is taken from the session snapshot only.
//! Nothing in the provider profile or the request can select it.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::account::{
    Account, BindingError, ExternalIdentity, QuotaCreditEvent, QuotaReason, SessionAccountId,
    SessionSnapshot, TrustLevelGrants,
};
use crate::domain::foundation::{AccountId, ErrorCode};
use crate::ports::{AccountStore, IdentityProvider, SessionEstablisher, SessionToken};

/// Callback request after the provider redirects back.
#[derive(Debug, Clone)]
pub struct OAuthCallbackCommand {
    pub session: SessionSnapshot,
    pub query_state: String,
    pub code: String,
    /// Referral code; only used when a new account is registered.
    pub aff_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuthOutcome {
    /// Existing linked account signed in.
    LoggedIn {
        account_id: AccountId,
        session: SessionToken,
    },
    /// New account created and signed in.
    Registered {
        account_id: AccountId,
        initial_grant: i64,
        session: SessionToken,
    },
    /// External identity attached to the session's account.
    Bound {
        account_id: AccountId,
        session: SessionToken,
    },
}

impl OAuthOutcome {
    pub fn account_id(&self) -> AccountId {
        match self {
            OAuthOutcome::LoggedIn { account_id, .. }
            | OAuthOutcome::Registered { account_id, .. }
            | OAuthOutcome::Bound { account_id, .. } => *account_id,
        }
    }

    pub fn session(&self) -> &SessionToken {
        match self {
            OAuthOutcome::LoggedIn { session, .. }
            | OAuthOutcome::Registered { session, .. }
            | OAuthOutcome::Bound { session, .. } => session,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            OAuthOutcome::LoggedIn { .. } => "login",
            OAuthOutcome::Registered { .. } => "register",
            OAuthOutcome::Bound { .. } => "bind",
        }
    }
}

/// Switches and amounts that govern the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityPolicy {
    pub oauth_enabled: bool,
    pub registration_enabled: bool,
    pub grants: TrustLevelGrants,
}

pub struct OAuthCallbackHandler {
    provider: Arc<dyn IdentityProvider>,
    accounts: Arc<dyn AccountStore>,
    sessions: Arc<dyn SessionEstablisher>,
    policy: IdentityPolicy,
}

impl OAuthCallbackHandler {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        accounts: Arc<dyn AccountStore>,
        sessions: Arc<dyn SessionEstablisher>,
        policy: IdentityPolicy,
    ) -> Self {
        Self {
            provider,
            accounts,
            sessions,
            policy,
        }
    }

    pub async fn handle(&self, cmd: OAuthCallbackCommand) -> Result<OAuthOutcome, BindingError> {
        if !cmd.session.state_matches(&cmd.query_state) {
            tracing::warn!("OAuth callback rejected: state mismatch");
            return Err(BindingError::StateMismatch);
        }
        if !self.policy.oauth_enabled {
            return Err(BindingError::OAuthDisabled);
        }

        match cmd.session.authenticated_account() {
            Some(session_account) => self.bind(session_account, &cmd.code).await,
            None => self.login_or_register(&cmd.code, cmd.aff_code.as_deref()).await,
        }
    }

    async fn bind(
        &self,
        session_account: SessionAccountId,
        code: &str,
    ) -> Result<OAuthOutcome, BindingError> {
        let identity = self.provider.exchange_code_for_profile(code).await?;
        let external_id = &identity.provider_user_id;

        if let Some(owner) = self.accounts.find_by_external_id(external_id).await? {
            if owner.id != session_account.account_id() {
                tracing::warn!(
                    external_id = %external_id,
                    account_id = %session_account,
                    "bind rejected: external identity belongs to another account"
                );
                return Err(BindingError::AlreadyLinked);
            }
        }

        let mut account = self
            .accounts
            .find_by_id(session_account.account_id())
            .await?
            .ok_or(BindingError::AccountNotFound)?;
        if !account.is_enabled() {
            return Err(BindingError::AccountDisabled);
        }

        account.link_external_identity(&identity);
        self.accounts.update(&account).await?;

        tracing::info!(
            external_id = %external_id,
            account_id = %account.id,
            trust_level = identity.trust_level,
            "external identity bound"
        );

        let session = self.sessions.establish(&account).await?;
        Ok(OAuthOutcome::Bound {
            account_id: account.id,
            session,
        })
    }

    async fn login_or_register(
        &self,
        code: &str,
        aff_code: Option<&str>,
    ) -> Result<OAuthOutcome, BindingError> {
        let identity = self.provider.exchange_code_for_profile(code).await?;

        if let Some(account) = self
            .accounts
            .find_by_external_id(&identity.provider_user_id)
            .await?
        {
            return self.login(account, &identity).await;
        }

        if !self.policy.registration_enabled {
            return Err(BindingError::RegistrationDisabled);
        }
        self.register(&identity, aff_code).await
    }

    async fn login(
        &self,
        mut account: Account,
        identity: &ExternalIdentity,
    ) -> Result<OAuthOutcome, BindingError> {
        account.refresh_trust_level(identity.trust_level);
        self.accounts.update(&account).await?;

        if !account.is_enabled() {
            tracing::info!(account_id = %account.id, "login refused: account disabled");
            return Err(BindingError::AccountDisabled);
        }

        let session = self.sessions.establish(&account).await?;
        tracing::info!(
            external_id = %identity.provider_user_id,
            account_id = %account.id,
            "external identity login"
        );
        Ok(OAuthOutcome::LoggedIn {
            account_id: account.id,
            session,
        })
    }

    async fn register(
        &self,
        identity: &ExternalIdentity,
        aff_code: Option<&str>,
    ) -> Result<OAuthOutcome, BindingError> {
        let inviter_id = self.resolve_inviter(aff_code).await;
        let id = self.accounts.next_account_id().await?;
        let username = format!("{}_{}", self.provider.provider_name(), id);

        let mut account = Account::register(id, username, identity, new_aff_code(), inviter_id);

        let mut attempts = 1;
        while let Err(err) = self.accounts.insert(&account).await {
            match err.code {
                ErrorCode::ExternalIdentityTaken => {
                    // A concurrent callback registered this identity first.
                    let existing = self
                        .accounts
                        .find_by_external_id(&identity.provider_user_id)
                        .await?
                        .ok_or(BindingError::AlreadyLinked)?;
                    return self.login(existing, identity).await;
                }
                ErrorCode::AffCodeTaken if attempts < AFF_CODE_ATTEMPTS => {
                    attempts += 1;
                    account.aff_code = new_aff_code();
                }
                _ => return Err(err.into()),
            }
        }

        let initial_grant = self.grant_initial_quota(&account, identity.trust_level).await;

        let session = self.sessions.establish(&account).await?;
        tracing::info!(
            external_id = %identity.provider_user_id,
            account_id = %account.id,
            username = %account.username,
            initial_grant,
            "account registered through external identity"
        );
        Ok(OAuthOutcome::Registered {
            account_id: account.id,
            initial_grant,
            session,
        })
    }

    /// Credits the trust-level grant, returning the amount credited.
    async fn grant_initial_quota(&self, account: &Account, trust_level: i32) -> i64 {
        let amount = match self.policy.grants.grant_for(trust_level) {
            Some(amount) if amount > 0 => amount,
            Some(_) => return 0,
            None => {
                tracing::warn!(
                    account_id = %account.id,
                    trust_level,
                    "no registration grant for trust level"
                );
                return 0;
            }
        };

        let event = QuotaCreditEvent::new(
            account.id,
            amount,
            QuotaReason::RegistrationGrant { trust_level },
        );
        match self.accounts.credit_quota(event).await {
            Ok(_) => amount,
            Err(e) => {
                tracing::error!(
                    account_id = %account.id,
                    amount,
                    error = %e,
                    "registration grant failed"
                );
                0
            }
        }
    }

    async fn resolve_inviter(&self, aff_code: Option<&str>) -> Option<AccountId> {
        let code = aff_code.filter(|c| !c.is_empty())?;
        match self.accounts.find_id_by_aff_code(code).await {
            Ok(inviter) => inviter,
            Err(e) => {
                tracing::warn!(error = %e, "affiliate lookup failed, ignoring code");
                None
            }
        }
    }
}

/// Fresh codes drawn before giving up on a crowded code space.
const AFF_CODE_ATTEMPTS: usize = 8;

/// Four-character referral code.
fn new_aff_code() -> String {
    Uuid::new_v4().simple().to_string()[..4].to_string()
}
