//! HTTP handlers for top-up and Stripe webhook endpoints.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::{
    CreatePendingOrderCommand, CreatePendingOrderHandler, HandlePaymentWebhookCommand,
    HandlePaymentWebhookHandler, QuoteTopUpCommand, QuoteTopUpHandler,
};
use crate::domain::settlement::{SettlementError, WebhookError};

use super::super::middleware::RequireAccount;
use super::dto::{AmountData, AmountRequest, PayLinkData, PayRequest, TopUpResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct SettlementAppState {
    pub create_order_handler: Arc<CreatePendingOrderHandler>,
    pub quote_handler: Arc<QuoteTopUpHandler>,
    pub webhook_handler: Arc<HandlePaymentWebhookHandler>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Top-up Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/user/pay - Create a pending order and return the checkout link
pub async fn request_pay_link(
    State(state): State<SettlementAppState>,
    RequireAccount(account): RequireAccount,
    Json(request): Json<PayRequest>,
) -> Result<impl IntoResponse, TopUpApiError> {
    let cmd = CreatePendingOrderCommand {
        account_id: account.account_id(),
        requested_amount: request.amount,
        payment_method: request.payment_method,
        top_up_code: request.top_up_code,
    };

    let result = state.create_order_handler.handle(cmd).await?;

    Ok(Json(TopUpResponse::success(PayLinkData {
        pay_link: result.pay_link,
        trade_no: result.trade_no.to_string(),
    })))
}

/// POST /api/user/amount - Quote a top-up
pub async fn request_amount(
    State(state): State<SettlementAppState>,
    RequireAccount(account): RequireAccount,
    Json(request): Json<AmountRequest>,
) -> Result<impl IntoResponse, TopUpApiError> {
    let cmd = QuoteTopUpCommand {
        account_id: account.account_id(),
        requested_amount: request.amount,
        top_up_code: request.top_up_code,
    };

    let quote = state.quote_handler.handle(cmd).await?;

    Ok(Json(TopUpResponse::success(AmountData::from(quote))))
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Handler
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/stripe - Handle Stripe webhooks
pub async fn handle_stripe_webhook(
    State(state): State<SettlementAppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<StatusCode, WebhookApiError> {
    // Extract Stripe signature header
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookError::MissingField("Stripe-Signature"))?;

    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    state.webhook_handler.handle(cmd).await?;

    Ok(StatusCode::OK)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts settlement errors to HTTP responses.
pub struct TopUpApiError(SettlementError);

impl From<SettlementError> for TopUpApiError {
    fn from(err: SettlementError) -> Self {
        Self(err)
    }
}

impl IntoResponse for TopUpApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let body = TopUpResponse {
            message: "error".to_string(),
            data: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// API error type for webhook deliveries.
///
/// 4xx tells Stripe to stop; 5xx asks for redelivery.
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if self.0.is_retryable() {
            tracing::error!(error = %self.0, "Stripe webhook failed, requesting redelivery");
        }
        (
            status,
            Json(serde_json::json!({
                "error": self.0.to_string(),
                "retryable": self.0.is_retryable()
            })),
        )
            .into_response()
    }
}
