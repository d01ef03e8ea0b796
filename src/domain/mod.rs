//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, state machine, errors)
//! - `account` - Local accounts, linked external identities, quota credits
//! - `settlement` - Top-up orders and payment webhook verification

pub mod account;
pub mod foundation;
pub mod settlement;
