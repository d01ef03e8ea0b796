//! CreatePendingOrderHandler - hands out a Stripe checkout link for a top-up.

use std::sync::Arc;

use crate::domain::foundation::{AccountId, TradeNo};
use crate::domain::settlement::{
    generate_trade_no, GroupRatios, PaymentMethod, SettlementError, SettlementOrder, TopUpLimits,
};
use crate::ports::{AccountStore, CheckoutProvider, CheckoutRequest, OrderRepository};

/// Top-up settings shared by the pay and quote handlers.
#[derive(Debug, Clone)]
pub struct TopUpPolicy {
    pub payments_enabled: bool,
    pub limits: TopUpLimits,
    pub group_ratios: GroupRatios,
    /// Public base URL; checkout returns to `/log` or `/topup` below it.
    pub server_address: String,
}

impl TopUpPolicy {
    fn success_url(&self) -> String {
        format!("{}/log", self.server_address.trim_end_matches('/'))
    }

    fn cancel_url(&self) -> String {
        format!("{}/topup", self.server_address.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone)]
pub struct CreatePendingOrderCommand {
    pub account_id: AccountId,
    pub requested_amount: i64,
    pub payment_method: String,
    /// Accepted for compatibility; not used.
    pub top_up_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePendingOrderResult {
    pub pay_link: String,
    pub trade_no: TradeNo,
}

pub struct CreatePendingOrderHandler {
    accounts: Arc<dyn AccountStore>,
    orders: Arc<dyn OrderRepository>,
    checkout: Arc<dyn CheckoutProvider>,
    policy: TopUpPolicy,
}

impl CreatePendingOrderHandler {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        orders: Arc<dyn OrderRepository>,
        checkout: Arc<dyn CheckoutProvider>,
        policy: TopUpPolicy,
    ) -> Self {
        Self {
            accounts,
            orders,
            checkout,
            policy,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreatePendingOrderCommand,
    ) -> Result<CreatePendingOrderResult, SettlementError> {
        if !self.policy.payments_enabled {
            return Err(SettlementError::PaymentsDisabled);
        }
        let _method: PaymentMethod = cmd.payment_method.parse()?;
        self.policy.limits.check(cmd.requested_amount)?;

        let account = self
            .accounts
            .find_by_id(cmd.account_id)
            .await?
            .ok_or(SettlementError::AccountNotFound)?;

        let charged_amount = self
            .policy
            .group_ratios
            .charged_amount(cmd.requested_amount, &account.group)
            .ok_or_else(|| self.policy.limits.out_of_range(cmd.requested_amount))?;
        let trade_no = generate_trade_no(account.id);

        let request = CheckoutRequest {
            trade_no: trade_no.clone(),
            quantity: cmd.requested_amount,
            customer_id: account.payment_customer_id.clone(),
            customer_email: account.email.clone(),
            success_url: self.policy.success_url(),
            cancel_url: self.policy.cancel_url(),
        };
        let session = self
            .checkout
            .create_checkout_session(request)
            .await
            .map_err(|e| {
                tracing::error!(
                    trade_no = %trade_no,
                    account_id = %account.id,
                    error = %e,
                    "checkout session creation failed"
                );
                SettlementError::CheckoutCreationFailed(e.to_string())
            })?;

        let order = SettlementOrder::pending(
            trade_no.clone(),
            account.id,
            cmd.requested_amount,
            charged_amount,
            Some(session.id.clone()),
        );
        if let Err(e) = self.orders.insert(&order).await {
            tracing::error!(
                trade_no = %trade_no,
                checkout_session_id = %session.id,
                error = %e,
                "orphaned checkout session: pending order not stored"
            );
            return Err(SettlementError::OrderPersistFailed {
                trade_no: trade_no.to_string(),
                reason: e.message,
            });
        }

        tracing::info!(
            trade_no = %trade_no,
            account_id = %account.id,
            requested_amount = cmd.requested_amount,
            charged_amount = %charged_amount,
            "pending order created"
        );

        Ok(CreatePendingOrderResult {
            pay_link: session.url,
            trade_no,
        })
    }
}
