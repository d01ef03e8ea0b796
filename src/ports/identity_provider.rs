//! Identity provider port.
//!
//! Wraps the two remote calls of an OAuth authorization-code login: token
//! exchange, then profile fetch.
//!
//! # Contract
//!
//! - Empty code: `IdentityError::InvalidInput`, no remote call
//! - Transport failure or timeout on either call: `ProviderUnreachable`
//! - Undecodable profile or zero/empty user id: `InvalidResponse`
//! - Trust level below the configured minimum: `InsufficientTrust`
//! - No retries; authorization codes are single-use

use async_trait::async_trait;

use crate::domain::account::{ExternalIdentity, IdentityError};

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short provider name, used as the username prefix (`"linuxdo"`).
    fn provider_name(&self) -> &'static str;

    async fn exchange_code_for_profile(&self, code: &str)
        -> Result<ExternalIdentity, IdentityError>;
}
