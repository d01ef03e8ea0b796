//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - axum routers for the OAuth, top-up, and webhook endpoints
//! - `memory` - In-memory account, order, and session stores
//! - `oauth` - LINUX DO identity provider
//! - `stripe` - Stripe Checkout provider

pub mod http;
pub mod memory;
pub mod oauth;
pub mod stripe;

pub use memory::{InMemoryAccountStore, InMemoryOrderRepository, InMemorySessionStore};
pub use oauth::{LinuxDoConfig, LinuxDoIdentityProvider};
pub use stripe::{StripeCheckoutAdapter, StripeConfig};
