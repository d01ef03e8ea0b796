//! In-memory settlement order repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, TradeNo};
use crate::domain::settlement::SettlementOrder;
use crate::ports::OrderRepository;

#[derive(Debug, Default, Clone)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<TradeNo, SettlementOrder>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: &SettlementOrder) -> Result<(), DomainError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.trade_no) {
            return Err(DomainError::new(ErrorCode::TradeNoTaken, "trade number exists")
                .with_detail("trade_no", order.trade_no.as_str()));
        }
        orders.insert(order.trade_no.clone(), order.clone());
        Ok(())
    }

    async fn find_by_trade_no(
        &self,
        trade_no: &TradeNo,
    ) -> Result<Option<SettlementOrder>, DomainError> {
        Ok(self.orders.read().await.get(trade_no).cloned())
    }

    async fn update(&self, order: &SettlementOrder) -> Result<(), DomainError> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&order.trade_no) {
            Some(stored) => {
                *stored = order.clone();
                Ok(())
            }
            None => Err(DomainError::new(ErrorCode::OrderNotFound, "order not found")
                .with_detail("trade_no", order.trade_no.as_str())),
        }
    }
}
