//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, the transition guard trait, and the error
//! vocabulary used by ports.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{AccountId, TradeNo};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
