//! Settlement order and its status lifecycle.
//!
//! An order is created `Pending` when a checkout link is handed out and moves
//! exactly once to `Success` or `Expired` when the payment provider calls back.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccountId, StateMachine, Timestamp, TradeNo, ValidationError};

/// Lifecycle of a settlement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Checkout link issued, awaiting the provider.
    Pending,

    /// Payment confirmed, quota credited.
    Success,

    /// Checkout session expired unpaid.
    Expired,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Success => "success",
            OrderStatus::Expired => "expired",
        }
    }
}

impl StateMachine for OrderStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use OrderStatus::*;
        matches!((self, target), (Pending, Success) | (Pending, Expired))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use OrderStatus::*;
        match self {
            Pending => vec![Success, Expired],
            Success | Expired => vec![],
        }
    }
}

/// Local record of a top-up payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementOrder {
    pub trade_no: TradeNo,
    pub account_id: AccountId,

    /// Units the user asked for (checkout quantity).
    pub requested_amount: i64,

    /// Money figure after the group ratio.
    pub charged_amount: Decimal,

    pub status: OrderStatus,

    /// Provider-side checkout session, when known.
    pub checkout_session_id: Option<String>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SettlementOrder {
    pub fn pending(
        trade_no: TradeNo,
        account_id: AccountId,
        requested_amount: i64,
        charged_amount: Decimal,
        checkout_session_id: Option<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            trade_no,
            account_id,
            requested_amount,
            charged_amount,
            status: OrderStatus::Pending,
            checkout_session_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    /// Pending -> Success.
    pub fn complete(&mut self) -> Result<(), ValidationError> {
        self.transition(OrderStatus::Success)
    }

    /// Pending -> Expired.
    pub fn expire(&mut self) -> Result<(), ValidationError> {
        self.transition(OrderStatus::Expired)
    }

    /// Undoes a `complete()` whose quota credit could not be applied.
    ///
    /// Only valid while the caller still holds the order lock taken for the
    /// completion; the order goes back to waiting for redelivery.
    pub fn revert_uncredited_completion(&mut self) {
        if self.status == OrderStatus::Success {
            self.status = OrderStatus::Pending;
            self.updated_at = Timestamp::now();
        }
    }

    fn transition(&mut self, target: OrderStatus) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(target)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}
