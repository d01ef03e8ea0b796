//! Account domain module.
//!
//! Local accounts, the external identities linked to them, and quota credits.
//!
//! # Module Structure
//!
//! - `aggregate` - Account entity
//! - `identity` - External identity and session-derived account reference
//! - `quota` - Credit log entries and trust-level grants
//! - `errors` - Identity provider and binding errors

mod aggregate;
mod errors;
mod identity;
mod quota;

pub use aggregate::{Account, AccountStatus, Role, DEFAULT_GROUP};
pub use errors::{BindingError, IdentityError};
pub use identity::{ExternalIdentity, ExternalIdentityId, SessionAccountId, SessionSnapshot};
pub use quota::{QuotaCreditEvent, QuotaReason, TrustLevelGrants};
