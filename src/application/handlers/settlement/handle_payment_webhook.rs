//! HandlePaymentWebhookHandler - settles top-up orders from Stripe callbacks.
//!
//! Stripe delivers at least once and may deliver the same event concurrently.
//! Every transition happens under the per-trade-number lock after re-reading
//! the order, so a trade number is credited at most once no matter how many
//! deliveries arrive. Transitions run on a spawned task and finish even if
//! the delivery request is dropped.

use std::sync::Arc;

use crate::application::OrderLock;
use crate::domain::account::{QuotaCreditEvent, QuotaReason};
use crate::domain::foundation::{AccountId, TradeNo};
use crate::domain::settlement::{
    CheckoutSessionObject, OrderStatus, SettlementOrder, StripeEvent, StripeEventType,
    StripeWebhookVerifier, WebhookError,
};
use crate::ports::{AccountStore, OrderRepository};

/// Raw webhook delivery.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header value.
    pub signature: String,
}

/// What a verified delivery did. All variants are acknowledged with 2xx.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Order moved to `Success` and quota credited.
    Credited {
        trade_no: TradeNo,
        account_id: AccountId,
        quota_delta: i64,
        new_balance: i64,
    },
    /// Order moved to `Expired`.
    Expired { trade_no: TradeNo },
    /// Order already left `Pending`; duplicate or late delivery.
    AlreadySettled {
        trade_no: TradeNo,
        status: OrderStatus,
    },
    /// No local order carries this reference.
    OrderNotFound { reference: String },
    /// Event kind or session status not acted on.
    Ignored { reason: String },
}

pub struct HandlePaymentWebhookHandler {
    verifier: StripeWebhookVerifier,
    settlement: Settlement,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        verifier: StripeWebhookVerifier,
        orders: Arc<dyn OrderRepository>,
        accounts: Arc<dyn AccountStore>,
        locks: Arc<OrderLock>,
        quota_per_unit: i64,
    ) -> Self {
        Self {
            verifier,
            settlement: Settlement {
                orders,
                accounts,
                locks,
                quota_per_unit,
            },
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<WebhookOutcome, WebhookError> {
        // 1. Nothing below runs for an unauthenticated payload
        let event = self
            .verifier
            .verify_and_parse(&cmd.payload, &cmd.signature)
            .map_err(|e| {
                tracing::warn!(error = %e, "Stripe webhook rejected");
                e
            })?;

        // 2. Dispatch on event kind
        match event.parsed_type() {
            StripeEventType::CheckoutSessionCompleted => self.handle_completed(&event).await,
            StripeEventType::CheckoutSessionExpired => self.handle_expired(&event).await,
            StripeEventType::Unknown => {
                tracing::info!(event_id = %event.id, event_type = %event.event_type, "Stripe event ignored");
                Ok(WebhookOutcome::Ignored {
                    reason: format!("unhandled event type {}", event.event_type),
                })
            }
        }
    }

    async fn handle_completed(&self, event: &StripeEvent) -> Result<WebhookOutcome, WebhookError> {
        let session = checkout_session(event)?;
        let reference = reference_of(&session)?;

        if !session.is_completed() {
            tracing::warn!(
                reference = %reference,
                status = session.status.as_deref().unwrap_or(""),
                "checkout completed with unexpected status"
            );
            return Ok(WebhookOutcome::Ignored {
                reason: format!(
                    "checkout status {}",
                    session.status.as_deref().unwrap_or("missing")
                ),
            });
        }

        let Ok(trade_no) = TradeNo::parse(reference) else {
            return Ok(not_found(reference));
        };

        let settlement = self.settlement.clone();
        detached(async move { settlement.complete(trade_no, session).await }).await
    }

    async fn handle_expired(&self, event: &StripeEvent) -> Result<WebhookOutcome, WebhookError> {
        let session = checkout_session(event)?;
        let reference = reference_of(&session)?;

        if session.status.as_deref() != Some("expired") {
            tracing::warn!(
                reference = %reference,
                status = session.status.as_deref().unwrap_or(""),
                "checkout expired with unexpected status"
            );
            return Ok(WebhookOutcome::Ignored {
                reason: format!(
                    "checkout status {}",
                    session.status.as_deref().unwrap_or("missing")
                ),
            });
        }

        let Ok(trade_no) = TradeNo::parse(reference) else {
            return Ok(not_found(reference));
        };

        let settlement = self.settlement.clone();
        detached(async move { settlement.expire(trade_no).await }).await
    }
}

/// Runs `work` on its own task. Dropping the caller (client disconnect,
/// request timeout) leaves the task running to completion, so an order is
/// never left marked settled without its credit.
async fn detached<F>(work: F) -> Result<WebhookOutcome, WebhookError>
where
    F: std::future::Future<Output = Result<WebhookOutcome, WebhookError>> + Send + 'static,
{
    tokio::spawn(work)
        .await
        .map_err(|e| WebhookError::Internal(format!("settlement task failed: {}", e)))?
}

/// Order transitions under the per-trade-number lock.
#[derive(Clone)]
struct Settlement {
    orders: Arc<dyn OrderRepository>,
    accounts: Arc<dyn AccountStore>,
    locks: Arc<OrderLock>,
    quota_per_unit: i64,
}

impl Settlement {
    async fn complete(
        &self,
        trade_no: TradeNo,
        session: CheckoutSessionObject,
    ) -> Result<WebhookOutcome, WebhookError> {
        let _guard = self.locks.acquire(&trade_no).await;

        let Some(mut order) = self.orders.find_by_trade_no(&trade_no).await? else {
            return Ok(not_found(trade_no.as_str()));
        };
        if !order.is_pending() {
            return Ok(already_settled(&order));
        }

        let quota_delta = order
            .requested_amount
            .checked_mul(self.quota_per_unit)
            .ok_or_else(|| WebhookError::Internal(format!("quota overflow for {}", trade_no)))?;

        order
            .complete()
            .map_err(|e| WebhookError::Internal(e.to_string()))?;
        self.orders.update(&order).await?;

        let credit = QuotaCreditEvent::new(
            order.account_id,
            quota_delta,
            QuotaReason::TopUp {
                trade_no: trade_no.clone(),
            },
        );
        let new_balance = match self.accounts.credit_quota(credit).await {
            Ok(balance) => balance,
            Err(e) => return Err(self.revert_completion(order, e.to_string()).await),
        };

        if let Some(customer) = session.customer.as_deref().filter(|c| !c.is_empty()) {
            if let Err(e) = self
                .accounts
                .set_payment_customer_id(order.account_id, customer)
                .await
            {
                tracing::warn!(
                    trade_no = %trade_no,
                    account_id = %order.account_id,
                    error = %e,
                    "failed to record payment customer id"
                );
            }
        }

        tracing::info!(
            trade_no = %trade_no,
            account_id = %order.account_id,
            quota_delta,
            charged_amount = %order.charged_amount,
            amount_total = session.amount_total.unwrap_or_default(),
            currency = %session.currency.as_deref().unwrap_or("").to_uppercase(),
            "top-up settled"
        );

        Ok(WebhookOutcome::Credited {
            trade_no,
            account_id: order.account_id,
            quota_delta,
            new_balance,
        })
    }

    async fn expire(&self, trade_no: TradeNo) -> Result<WebhookOutcome, WebhookError> {
        let _guard = self.locks.acquire(&trade_no).await;

        let Some(mut order) = self.orders.find_by_trade_no(&trade_no).await? else {
            return Ok(not_found(trade_no.as_str()));
        };
        if !order.is_pending() {
            return Ok(already_settled(&order));
        }

        order
            .expire()
            .map_err(|e| WebhookError::Internal(e.to_string()))?;
        self.orders.update(&order).await?;

        tracing::info!(trade_no = %trade_no, account_id = %order.account_id, "top-up order expired");
        Ok(WebhookOutcome::Expired { trade_no })
    }

    /// Puts a completed-but-uncredited order back to pending so the
    /// redelivery can settle it.
    async fn revert_completion(&self, mut order: SettlementOrder, reason: String) -> WebhookError {
        tracing::error!(
            trade_no = %order.trade_no,
            account_id = %order.account_id,
            error = %reason,
            "quota credit failed, reverting order to pending"
        );
        order.revert_uncredited_completion();
        if let Err(e) = self.orders.update(&order).await {
            tracing::error!(
                trade_no = %order.trade_no,
                error = %e,
                "failed to revert order; manual reconciliation required"
            );
        }
        WebhookError::CreditFailed(reason)
    }
}

fn checkout_session(event: &StripeEvent) -> Result<CheckoutSessionObject, WebhookError> {
    event
        .deserialize_object()
        .map_err(|e| WebhookError::ParseError(format!("checkout session: {}", e)))
}

fn reference_of(session: &CheckoutSessionObject) -> Result<&str, WebhookError> {
    session
        .client_reference_id
        .as_deref()
        .filter(|r| !r.is_empty())
        .ok_or(WebhookError::MissingField("client_reference_id"))
}

fn not_found(reference: &str) -> WebhookOutcome {
    tracing::warn!(reference = %reference, "webhook for unknown order");
    WebhookOutcome::OrderNotFound {
        reference: reference.to_string(),
    }
}

fn already_settled(order: &SettlementOrder) -> WebhookOutcome {
    tracing::info!(
        trade_no = %order.trade_no,
        status = order.status.as_str(),
        "duplicate delivery for settled order"
    );
    WebhookOutcome::AlreadySettled {
        trade_no: order.trade_no.clone(),
        status: order.status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAccountStore, InMemoryOrderRepository};
    use crate::domain::account::{Account, ExternalIdentity, ExternalIdentityId};
    use crate::domain::foundation::DomainError;
    use crate::domain::settlement::{compute_test_signature_header, StripeEventBuilder};
    use async_trait::async_trait;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use secrecy::SecretString;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    const SECRET: &str = "whsec_test_secret";
    const TRADE_NO: &str = "ref_abc123";

    // ════════════════════════════════════════════════════════════════════════════
    // Fixtures
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        accounts: Arc<InMemoryAccountStore>,
        orders: InMemoryOrderRepository,
        account_id: AccountId,
        handler: Arc<HandlePaymentWebhookHandler>,
    }

    async fn seed(accounts: &InMemoryAccountStore, orders: &InMemoryOrderRepository) -> AccountId {
        let id = accounts.next_account_id().await.unwrap();
        let account = Account::register(
            id,
            format!("linuxdo_{}", id),
            &ExternalIdentity {
                provider_user_id: ExternalIdentityId::new("7001").unwrap(),
                display_name: "Payer".into(),
                username: "payer".into(),
                trust_level: 1,
                active: true,
            },
            "pay1".into(),
            None,
        );
        accounts.insert(&account).await.unwrap();
        orders
            .insert(&SettlementOrder::pending(
                TradeNo::parse(TRADE_NO).unwrap(),
                id,
                500,
                dec!(500),
                Some("cs_test_abc".into()),
            ))
            .await
            .unwrap();
        id
    }

    fn handler_with(
        accounts: Arc<dyn AccountStore>,
        orders: InMemoryOrderRepository,
    ) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            StripeWebhookVerifier::new(SecretString::new(SECRET.to_string())),
            Arc::new(orders),
            accounts,
            Arc::new(OrderLock::new()),
            1,
        )
    }

    async fn fixture() -> Fixture {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let orders = InMemoryOrderRepository::new();
        let account_id = seed(&accounts, &orders).await;
        let handler = Arc::new(handler_with(accounts.clone(), orders.clone()));
        Fixture {
            accounts,
            orders,
            account_id,
            handler,
        }
    }

    fn signed(payload: String) -> HandlePaymentWebhookCommand {
        let signature =
            compute_test_signature_header(SECRET, chrono::Utc::now().timestamp(), &payload);
        HandlePaymentWebhookCommand {
            payload: payload.into_bytes(),
            signature,
        }
    }

    fn completed(trade_no: &str) -> HandlePaymentWebhookCommand {
        signed(
            StripeEventBuilder::new()
                .event_type("checkout.session.completed")
                .checkout_session(trade_no, "complete")
                .to_json(),
        )
    }

    fn expired(trade_no: &str) -> HandlePaymentWebhookCommand {
        signed(
            StripeEventBuilder::new()
                .event_type("checkout.session.expired")
                .checkout_session(trade_no, "expired")
                .to_json(),
        )
    }

    impl Fixture {
        async fn balance(&self) -> i64 {
            self.accounts
                .find_by_id(self.account_id)
                .await
                .unwrap()
                .unwrap()
                .quota
        }

        async fn status(&self) -> OrderStatus {
            self.orders
                .find_by_trade_no(&TradeNo::parse(TRADE_NO).unwrap())
                .await
                .unwrap()
                .unwrap()
                .status
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Completion
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn completed_event_credits_once() {
        let f = fixture().await;

        let outcome = f.handler.handle(completed(TRADE_NO)).await.unwrap();

        assert!(matches!(
            outcome,
            WebhookOutcome::Credited {
                quota_delta: 500,
                new_balance: 500,
                ..
            }
        ));
        assert_eq!(f.status().await, OrderStatus::Success);
        assert_eq!(f.balance().await, 500);
    }

    #[tokio::test]
    async fn completed_event_records_customer_id() {
        let f = fixture().await;

        f.handler.handle(completed(TRADE_NO)).await.unwrap();

        let account = f.accounts.find_by_id(f.account_id).await.unwrap().unwrap();
        assert_eq!(account.payment_customer_id.as_deref(), Some("cus_test_1"));
    }

    #[tokio::test]
    async fn quota_per_unit_scales_the_credit() {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let orders = InMemoryOrderRepository::new();
        let account_id = seed(&accounts, &orders).await;
        let handler = HandlePaymentWebhookHandler::new(
            StripeWebhookVerifier::new(SecretString::new(SECRET.to_string())),
            Arc::new(orders),
            accounts.clone(),
            Arc::new(OrderLock::new()),
            1000,
        );

        handler.handle(completed(TRADE_NO)).await.unwrap();

        let account = accounts.find_by_id(account_id).await.unwrap().unwrap();
        assert_eq!(account.quota, 500_000);
    }

    #[tokio::test]
    async fn sequential_duplicates_credit_once() {
        let f = fixture().await;

        f.handler.handle(completed(TRADE_NO)).await.unwrap();
        for _ in 0..5 {
            let outcome = f.handler.handle(completed(TRADE_NO)).await.unwrap();
            assert!(matches!(
                outcome,
                WebhookOutcome::AlreadySettled {
                    status: OrderStatus::Success,
                    ..
                }
            ));
        }

        assert_eq!(f.balance().await, 500);
        assert_eq!(f.accounts.quota_events(f.account_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_duplicates_credit_once() {
        let f = fixture().await;

        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let handler = f.handler.clone();
                tokio::spawn(async move { handler.handle(completed(TRADE_NO)).await })
            })
            .collect();
        let mut credited = 0;
        for task in tasks {
            if let WebhookOutcome::Credited { .. } = task.await.unwrap().unwrap() {
                credited += 1;
            }
        }

        assert_eq!(credited, 1);
        assert_eq!(f.balance().await, 500);
        assert_eq!(f.status().await, OrderStatus::Success);
    }

    #[tokio::test]
    async fn unknown_trade_no_is_acknowledged() {
        let f = fixture().await;

        let outcome = f.handler.handle(completed("ref_ffff")).await.unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::OrderNotFound {
                reference: "ref_ffff".into()
            }
        );
        assert_eq!(f.balance().await, 0);
    }

    #[tokio::test]
    async fn malformed_reference_is_acknowledged_as_unknown() {
        let f = fixture().await;

        let outcome = f.handler.handle(completed("new-api-ref-1")).await.unwrap();

        assert!(matches!(outcome, WebhookOutcome::OrderNotFound { .. }));
    }

    #[tokio::test]
    async fn open_session_status_is_ignored() {
        let f = fixture().await;
        let cmd = signed(
            StripeEventBuilder::new()
                .event_type("checkout.session.completed")
                .checkout_session(TRADE_NO, "open")
                .to_json(),
        );

        let outcome = f.handler.handle(cmd).await.unwrap();

        assert!(matches!(outcome, WebhookOutcome::Ignored { .. }));
        assert_eq!(f.status().await, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn missing_reference_is_a_client_error() {
        let f = fixture().await;
        let cmd = signed(
            StripeEventBuilder::new()
                .event_type("checkout.session.completed")
                .object(serde_json::json!({"id": "cs_1", "status": "complete"}))
                .to_json(),
        );

        let err = f.handler.handle(cmd).await.unwrap_err();

        assert!(matches!(err, WebhookError::MissingField("client_reference_id")));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn unhandled_event_type_is_ignored() {
        let f = fixture().await;
        let cmd = signed(
            StripeEventBuilder::new()
                .event_type("invoice.paid")
                .checkout_session(TRADE_NO, "complete")
                .to_json(),
        );

        let outcome = f.handler.handle(cmd).await.unwrap();

        assert!(matches!(outcome, WebhookOutcome::Ignored { .. }));
        assert_eq!(f.balance().await, 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Expiry
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn expired_event_expires_pending_order() {
        let f = fixture().await;

        let outcome = f.handler.handle(expired(TRADE_NO)).await.unwrap();

        assert!(matches!(outcome, WebhookOutcome::Expired { .. }));
        assert_eq!(f.status().await, OrderStatus::Expired);
        assert_eq!(f.balance().await, 0);
    }

    #[tokio::test]
    async fn expired_after_completed_changes_nothing() {
        let f = fixture().await;
        f.handler.handle(completed(TRADE_NO)).await.unwrap();

        let outcome = f.handler.handle(expired(TRADE_NO)).await.unwrap();

        assert!(matches!(
            outcome,
            WebhookOutcome::AlreadySettled {
                status: OrderStatus::Success,
                ..
            }
        ));
        assert_eq!(f.status().await, OrderStatus::Success);
        assert_eq!(f.balance().await, 500);
    }

    #[tokio::test]
    async fn completed_after_expired_credits_nothing() {
        let f = fixture().await;
        f.handler.handle(expired(TRADE_NO)).await.unwrap();

        let outcome = f.handler.handle(completed(TRADE_NO)).await.unwrap();

        assert!(matches!(outcome, WebhookOutcome::AlreadySettled { .. }));
        assert_eq!(f.balance().await, 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Signature Gate
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn bad_signature_mutates_nothing() {
        let f = fixture().await;
        let mut cmd = completed(TRADE_NO);
        cmd.signature = compute_test_signature_header(
            "whsec_wrong",
            chrono::Utc::now().timestamp(),
            std::str::from_utf8(&cmd.payload).unwrap(),
        );

        let err = f.handler.handle(cmd).await.unwrap_err();

        assert!(matches!(err, WebhookError::InvalidSignature));
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
        assert_eq!(f.status().await, OrderStatus::Pending);
        assert_eq!(f.balance().await, 0);
    }

    #[tokio::test]
    async fn tampered_payload_is_rejected() {
        let f = fixture().await;
        let mut cmd = completed(TRADE_NO);
        cmd.payload = String::from_utf8(cmd.payload)
            .unwrap()
            .replace("50000", "99999")
            .into_bytes();

        assert!(f.handler.handle(cmd).await.is_err());
        assert_eq!(f.balance().await, 0);
    }

    #[tokio::test]
    async fn stale_signature_is_rejected() {
        let f = fixture().await;
        let payload = StripeEventBuilder::new()
            .event_type("checkout.session.completed")
            .checkout_session(TRADE_NO, "complete")
            .to_json();
        let cmd = HandlePaymentWebhookCommand {
            signature: compute_test_signature_header(
                SECRET,
                chrono::Utc::now().timestamp() - 3600,
                &payload,
            ),
            payload: payload.into_bytes(),
        };

        let err = f.handler.handle(cmd).await.unwrap_err();

        assert!(matches!(err, WebhookError::TimestampOutOfRange));
        assert_eq!(f.status().await, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn missing_signature_header_is_a_client_error() {
        let f = fixture().await;
        let mut cmd = completed(TRADE_NO);
        cmd.signature = String::new();

        let err = f.handler.handle(cmd).await.unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(f.balance().await, 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Credit Failure
    // ════════════════════════════════════════════════════════════════════════════

    /// Fails `credit_quota` while `fail_credit` is set; sleeps `credit_delay` first.
    struct FlakyAccountStore {
        inner: Arc<InMemoryAccountStore>,
        fail_credit: AtomicBool,
        credit_delay: Duration,
    }

    #[async_trait]
    impl AccountStore for FlakyAccountStore {
        async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, DomainError> {
            self.inner.find_by_id(id).await
        }
        async fn find_by_external_id(
            &self,
            id: &ExternalIdentityId,
        ) -> Result<Option<Account>, DomainError> {
            self.inner.find_by_external_id(id).await
        }
        async fn find_id_by_aff_code(&self, c: &str) -> Result<Option<AccountId>, DomainError> {
            self.inner.find_id_by_aff_code(c).await
        }
        async fn next_account_id(&self) -> Result<AccountId, DomainError> {
            self.inner.next_account_id().await
        }
        async fn insert(&self, a: &Account) -> Result<(), DomainError> {
            self.inner.insert(a).await
        }
        async fn update(&self, a: &Account) -> Result<(), DomainError> {
            self.inner.update(a).await
        }
        async fn set_payment_customer_id(&self, id: AccountId, c: &str) -> Result<(), DomainError> {
            self.inner.set_payment_customer_id(id, c).await
        }
        async fn credit_quota(&self, e: QuotaCreditEvent) -> Result<i64, DomainError> {
            tokio::time::sleep(self.credit_delay).await;
            if self.fail_credit.load(Ordering::SeqCst) {
                return Err(DomainError::database("connection reset"));
            }
            self.inner.credit_quota(e).await
        }
        async fn quota_events(&self, id: AccountId) -> Result<Vec<QuotaCreditEvent>, DomainError> {
            self.inner.quota_events(id).await
        }
    }

    #[tokio::test]
    async fn credit_failure_reverts_order_and_asks_for_redelivery() {
        let inner = Arc::new(InMemoryAccountStore::new());
        let orders = InMemoryOrderRepository::new();
        let account_id = seed(&inner, &orders).await;
        let flaky = Arc::new(FlakyAccountStore {
            inner: inner.clone(),
            fail_credit: AtomicBool::new(true),
            credit_delay: Duration::ZERO,
        });
        let handler = handler_with(flaky.clone(), orders.clone());

        let err = handler.handle(completed(TRADE_NO)).await.unwrap_err();

        assert!(matches!(err, WebhookError::CreditFailed(_)));
        assert!(err.is_retryable());
        let order = orders
            .find_by_trade_no(&TradeNo::parse(TRADE_NO).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);

        flaky.fail_credit.store(false, Ordering::SeqCst);
        let outcome = handler.handle(completed(TRADE_NO)).await.unwrap();

        assert!(matches!(outcome, WebhookOutcome::Credited { .. }));
        let account = inner.find_by_id(account_id).await.unwrap().unwrap();
        assert_eq!(account.quota, 500);
    }

    #[tokio::test]
    async fn dropped_delivery_still_credits() {
        let inner = Arc::new(InMemoryAccountStore::new());
        let orders = InMemoryOrderRepository::new();
        let account_id = seed(&inner, &orders).await;
        let slow = Arc::new(FlakyAccountStore {
            inner: inner.clone(),
            fail_credit: AtomicBool::new(false),
            credit_delay: Duration::from_millis(200),
        });
        let handler = handler_with(slow, orders.clone());

        let first =
            tokio::time::timeout(Duration::from_millis(50), handler.handle(completed(TRADE_NO)))
                .await;
        assert!(first.is_err());

        tokio::time::sleep(Duration::from_millis(400)).await;
        let account = inner.find_by_id(account_id).await.unwrap().unwrap();
        assert_eq!(account.quota, 500);

        let redelivery = handler.handle(completed(TRADE_NO)).await.unwrap();
        assert!(matches!(
            redelivery,
            WebhookOutcome::AlreadySettled {
                status: OrderStatus::Success,
                ..
            }
        ));
        let account = inner.find_by_id(account_id).await.unwrap().unwrap();
        assert_eq!(account.quota, 500);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Properties
    // ════════════════════════════════════════════════════════════════════════════

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn any_number_of_concurrent_deliveries_credits_once(deliveries in 1usize..12) {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(4)
                .enable_all()
                .build()
                .unwrap();
            let (balance, credited) = rt.block_on(async {
                let f = fixture().await;
                let tasks: Vec<_> = (0..deliveries)
                    .map(|_| {
                        let handler = f.handler.clone();
                        tokio::spawn(async move { handler.handle(completed(TRADE_NO)).await })
                    })
                    .collect();
                let mut credited = 0;
                for task in tasks {
                    if let Ok(Ok(WebhookOutcome::Credited { .. })) = task.await {
                        credited += 1;
                    }
                }
                (f.balance().await, credited)
            });

            prop_assert_eq!(balance, 500);
            prop_assert_eq!(credited, 1);
        }
    }
}
