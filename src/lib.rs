//! Credit Bridge - identity linking and payment settlement for API credits
//!
//! Accounts sign in or bind through an external OAuth provider and buy
//! quota through Stripe Checkout. Webhook settlement is idempotent per
//! trade number.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
