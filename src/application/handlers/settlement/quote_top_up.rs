//! QuoteTopUpHandler - price preview for a top-up amount.

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::foundation::AccountId;
use crate::domain::settlement::{pay_amount, SettlementError};
use crate::ports::AccountStore;

use super::TopUpPolicy;

#[derive(Debug, Clone)]
pub struct QuoteTopUpCommand {
    pub account_id: AccountId,
    pub requested_amount: i64,
    pub top_up_code: Option<String>,
}

/// Both figures are rounded half-away-from-zero to two places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopUpQuote {
    pub pay_amount: Decimal,
    pub charged_amount: Decimal,
}

pub struct QuoteTopUpHandler {
    accounts: Arc<dyn AccountStore>,
    policy: TopUpPolicy,
    unit_price: Decimal,
}

impl QuoteTopUpHandler {
    pub fn new(accounts: Arc<dyn AccountStore>, policy: TopUpPolicy, unit_price: Decimal) -> Self {
        Self {
            accounts,
            policy,
            unit_price,
        }
    }

    pub async fn handle(&self, cmd: QuoteTopUpCommand) -> Result<TopUpQuote, SettlementError> {
        if !self.policy.payments_enabled {
            return Err(SettlementError::PaymentsDisabled);
        }
        self.policy.limits.check(cmd.requested_amount)?;

        let account = self
            .accounts
            .find_by_id(cmd.account_id)
            .await?
            .ok_or(SettlementError::AccountNotFound)?;

        let out_of_range = || self.policy.limits.out_of_range(cmd.requested_amount);
        let pay = pay_amount(cmd.requested_amount, self.unit_price).ok_or_else(out_of_range)?;
        let charged = self
            .policy
            .group_ratios
            .charged_amount(cmd.requested_amount, &account.group)
            .ok_or_else(out_of_range)?;

        Ok(TopUpQuote {
            pay_amount: money(pay),
            charged_amount: money(charged),
        })
    }
}

fn money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
