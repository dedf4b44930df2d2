//! # Lightning-Checkout
//!
//! Diagnostic tool for a checkout backend: loads a checkout and a payment
//! method, then reports which strategy and Cardinal script would be used.
//!
//! ## Usage
//!
//! ```bash
//! export CHECKOUT_BASE_URL=https://store.example.com
//! export CHECKOUT_API_TOKEN=...
//!
//! lightning-checkout <methodId> [checkoutId]
//! ```

use async_trait::async_trait;
use pay_api::{
    create_payment_strategy_registry, CheckoutClient, HttpCheckoutStore,
    HttpSubmissionCoordinator, StrategyDependencies,
};
use pay_core::{CheckoutAction, CheckoutStore, PaymentError, PaymentResult};
use pay_cybersource::script::script_url;
use pay_cybersource::{CardinalScriptHost, CyberSourceConfig, SessionHandle};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// No browser here, so the Cardinal script cannot run
struct HeadlessScriptHost;

#[async_trait]
impl CardinalScriptHost for HeadlessScriptHost {
    async fn load_script(&self, url: &str) -> PaymentResult<()> {
        Err(PaymentError::ProviderError {
            provider: "cybersource".to_string(),
            message: format!("cannot load {} without a browser", url),
        })
    }

    fn cardinal(&self) -> Option<SessionHandle> {
        None
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let method_id = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: lightning-checkout <methodId> [checkoutId]"))?;
    let checkout_id = args.next();

    let client = Arc::new(
        CheckoutClient::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to configure checkout backend: {}", e))?,
    );
    let cybersource = CyberSourceConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to configure CyberSource: {}", e))?;

    info!("Checkout backend: {}", client.config().base_url);

    let store = Arc::new(HttpCheckoutStore::new(Arc::clone(&client)));
    let coordinator = Arc::new(HttpSubmissionCoordinator::new(Arc::clone(&client)));

    let registry = create_payment_strategy_registry(
        StrategyDependencies::new(store.clone(), coordinator, Arc::new(HeadlessScriptHost))
            .with_cybersource_config(cybersource.clone()),
    );
    info!("Payment strategies: {:?}", registry.keys());

    if let Some(checkout_id) = checkout_id {
        let snapshot = store
            .dispatch(CheckoutAction::LoadCheckout { checkout_id })
            .await?;
        if let Some(cart) = &snapshot.cart {
            info!("Cart {}: {}", cart.id, cart.total());
        }
    }

    let snapshot = store
        .dispatch(CheckoutAction::LoadPaymentMethod {
            method_id: method_id.clone(),
        })
        .await?;

    let Some(method) = snapshot.payment_method(&method_id) else {
        anyhow::bail!("payment method {} not returned by backend", method_id);
    };

    info!(
        "Payment method {}: test_mode={}, 3ds={}",
        method.id, method.config.test_mode, method.config.is_3ds_enabled
    );

    if registry.has(&method_id) {
        info!("Strategy: {}", method_id);
    } else {
        warn!("No strategy registered for {}", method_id);
    }

    if method.config.is_3ds_enabled {
        info!("Cardinal script: {}", script_url(method.config.test_mode));
        info!(
            "Validation timeout: {}",
            cybersource
                .validation_timeout
                .map(|t| format!("{}s", t.as_secs()))
                .unwrap_or_else(|| "none".to_string())
        );
        if method.client_token.is_none() {
            warn!("3-D Secure enabled but no client token issued");
        }
    }

    Ok(())
}
