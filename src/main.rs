//! Credit Bridge server binary.

use std::sync::Arc;

use credit_bridge::adapters::http::{api_router, IdentityAppState, SettlementAppState};
use credit_bridge::adapters::{
    InMemoryAccountStore, InMemoryOrderRepository, InMemorySessionStore, LinuxDoConfig,
    LinuxDoIdentityProvider, StripeCheckoutAdapter, StripeConfig,
};
use credit_bridge::application::{
    CreatePendingOrderHandler, HandlePaymentWebhookHandler, IdentityPolicy, OAuthCallbackHandler,
    OrderLock, QuoteTopUpHandler, TopUpPolicy,
};
use credit_bridge::config::AppConfig;
use credit_bridge::domain::settlement::StripeWebhookVerifier;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server.log_level, config.is_production());
    config.validate()?;

    let app = build_router(&config)?;

    let addr = config.server.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        oauth_enabled = config.oauth.enabled,
        payments_enabled = config.payment.enabled,
        "credit bridge listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn init_tracing(filter: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = std::env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| filter.to_string());

    if json {
        let _ = fmt().with_env_filter(EnvFilter::new(filter)).json().try_init();
    } else {
        let _ = fmt().with_env_filter(EnvFilter::new(filter)).try_init();
    }
}

fn build_router(config: &AppConfig) -> Result<axum::Router, Box<dyn std::error::Error>> {
    let accounts = Arc::new(InMemoryAccountStore::new());
    let orders = Arc::new(InMemoryOrderRepository::new());
    let sessions = Arc::new(InMemorySessionStore::new());

    let oauth = &config.oauth;
    let provider = LinuxDoIdentityProvider::new(
        LinuxDoConfig::new(oauth.client_id.clone(), oauth.client_secret.clone())
            .with_endpoints(oauth.token_url.clone(), oauth.user_url.clone())
            .with_min_trust_level(oauth.min_trust_level)
            .with_timeout(oauth.timeout()),
    )?;
    let callback_handler = OAuthCallbackHandler::new(
        Arc::new(provider),
        accounts.clone(),
        sessions.clone(),
        IdentityPolicy {
            oauth_enabled: oauth.enabled,
            registration_enabled: config.features.registration_enabled,
            grants: oauth.grants(),
        },
    );

    let payment = &config.payment;
    let checkout = StripeCheckoutAdapter::new(StripeConfig::new(
        payment.stripe_api_key.clone(),
        payment.stripe_price_id.clone(),
    ))?;
    let policy = TopUpPolicy {
        payments_enabled: payment.enabled,
        limits: payment.limits(),
        group_ratios: payment.parsed_group_ratios()?,
        server_address: payment.server_address.clone(),
    };
    let verifier = StripeWebhookVerifier::new(payment.stripe_webhook_secret.clone())
        .with_tolerance(payment.webhook_tolerance_secs);

    let identity = IdentityAppState {
        sessions: sessions.clone(),
        callback_handler: Arc::new(callback_handler),
    };
    let settlement = SettlementAppState {
        create_order_handler: Arc::new(CreatePendingOrderHandler::new(
            accounts.clone(),
            orders.clone(),
            Arc::new(checkout),
            policy.clone(),
        )),
        quote_handler: Arc::new(QuoteTopUpHandler::new(
            accounts.clone(),
            policy,
            payment.unit_price,
        )),
        webhook_handler: Arc::new(HandlePaymentWebhookHandler::new(
            verifier,
            orders,
            accounts,
            Arc::new(OrderLock::new()),
            payment.quota_per_unit,
        )),
    };

    let request_timeout = config.server.request_timeout();
    Ok(api_router(identity, settlement, sessions, request_timeout)
        .layer(TraceLayer::new_for_http()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
