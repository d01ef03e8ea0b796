//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `AccountStore` - Accounts, external identity linkage, quota log
//! - `OrderRepository` - Settlement orders keyed by trade number
//!
//! ## Remote Provider Ports
//!
//! - `IdentityProvider` - OAuth code exchange and profile fetch
//! - `CheckoutProvider` - Hosted payment checkout sessions
//!
//! ## Session Ports
//!
//! - `SessionStore` - Cookie-backed session state
//! - `SessionEstablisher` - Login session setup after a successful bind/login

mod account_store;
mod checkout_provider;
mod identity_provider;
mod order_repository;
mod session_store;

pub use account_store::AccountStore;
pub use checkout_provider::{
    CheckoutError, CheckoutErrorCode, CheckoutProvider, CheckoutRequest, CheckoutSession,
};
pub use identity_provider::IdentityProvider;
pub use order_repository::OrderRepository;
pub use session_store::{SessionEstablisher, SessionStore, SessionToken};
