//! In-memory adapters for tests and single-process runs.

mod account_store;
mod order_repository;
mod session_store;

pub use account_store::InMemoryAccountStore;
pub use order_repository::InMemoryOrderRepository;
pub use session_store::InMemorySessionStore;
