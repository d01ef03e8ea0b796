//! Per-trade-number mutual exclusion.
//!
//! One async mutex per trade number, created on first use and kept for the
//! life of the process. Growth is bounded by the number of distinct trade
//! numbers this process has settled.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::TradeNo;

/// Held while a settlement transition is in flight; released on drop.
pub type OrderGuard = OwnedMutexGuard<()>;

#[derive(Debug, Default)]
pub struct OrderLock {
    locks: DashMap<TradeNo, Arc<Mutex<()>>>,
}

impl OrderLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other task holds `trade_no`.
    pub async fn acquire(&self, trade_no: &TradeNo) -> OrderGuard {
        let handle = self
            .locks
            .entry(trade_no.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        // The DashMap shard guard is dropped above, before awaiting.
        handle.lock_owned().await
    }

    /// Number of trade numbers with a lock handle.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
