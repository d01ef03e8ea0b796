//! Settlement order persistence, keyed by trade number.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, TradeNo};
use crate::domain::settlement::SettlementOrder;

/// Repository for settlement orders.
///
/// Callers serialize read-modify-write sequences on one trade number through
/// the order lock; the repository itself only guarantees single-call atomicity.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Fails with `ErrorCode::TradeNoTaken` if the trade number exists.
    async fn insert(&self, order: &SettlementOrder) -> Result<(), DomainError>;

    async fn find_by_trade_no(
        &self,
        trade_no: &TradeNo,
    ) -> Result<Option<SettlementOrder>, DomainError>;

    /// Overwrites the stored order. Fails with `ErrorCode::OrderNotFound`
    /// if it was never inserted.
    async fn update(&self, order: &SettlementOrder) -> Result<(), DomainError>;
}
