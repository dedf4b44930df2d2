//! # HTTP Checkout Store
//!
//! `CheckoutStore` backed by the storefront API. `dispatch` fetches the
//! requested resource, folds it into the cached snapshot and resolves with
//! the updated snapshot.

use crate::client::{provider_error, CheckoutClient};
use async_trait::async_trait;
use pay_core::{
    Cart, CheckoutAction, CheckoutSnapshot, CheckoutStore, PaymentError, PaymentMethod,
    PaymentResult,
};
use parking_lot::RwLock;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Storefront checkout resource
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutResponse {
    id: String,
    #[serde(default)]
    cart: Option<Cart>,
    #[serde(default)]
    order_id: Option<String>,
}

/// Store that loads state from the checkout backend
pub struct HttpCheckoutStore {
    client: Arc<CheckoutClient>,
    snapshot: RwLock<CheckoutSnapshot>,
}

impl HttpCheckoutStore {
    pub fn new(client: Arc<CheckoutClient>) -> Self {
        Self {
            client,
            snapshot: RwLock::new(CheckoutSnapshot::default()),
        }
    }

    async fn load_payment_method(&self, method_id: &str) -> PaymentResult<CheckoutSnapshot> {
        let url = self.client.config().payment_method_url(method_id)?;
        let method: PaymentMethod = self
            .client
            .get_json(&url, |status, message| {
                if status == StatusCode::NOT_FOUND {
                    PaymentError::MissingConfiguration(message)
                } else {
                    provider_error(status, message)
                }
            })
            .await?;

        info!(method_id = %method.id, "Loaded payment method");
        let mut snapshot = self.snapshot.write();
        snapshot.upsert_payment_method(method);
        Ok(snapshot.clone())
    }

    async fn load_checkout(&self, checkout_id: &str) -> PaymentResult<CheckoutSnapshot> {
        let url = self.client.config().checkout_url(checkout_id)?;
        let checkout: CheckoutResponse = self.client.get_json(&url, provider_error).await?;

        info!(checkout_id = %checkout.id, "Loaded checkout");
        let mut snapshot = self.snapshot.write();
        snapshot.checkout_id = Some(checkout.id);
        snapshot.cart = checkout.cart;
        if checkout.order_id.is_some() {
            snapshot.order_id = checkout.order_id;
        }
        Ok(snapshot.clone())
    }
}

#[async_trait]
impl CheckoutStore for HttpCheckoutStore {
    fn state(&self) -> CheckoutSnapshot {
        self.snapshot.read().clone()
    }

    #[instrument(skip(self))]
    async fn dispatch(&self, action: CheckoutAction) -> PaymentResult<CheckoutSnapshot> {
        match action {
            CheckoutAction::LoadPaymentMethod { method_id } => {
                self.load_payment_method(&method_id).await
            }
            CheckoutAction::LoadCheckout { checkout_id } => self.load_checkout(&checkout_id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use pay_core::Currency;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn store(server: &MockServer) -> HttpCheckoutStore {
        let client = CheckoutClient::new(BackendConfig::new(server.uri())).unwrap();
        HttpCheckoutStore::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_load_payment_method() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/storefront/payments/cybersource"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cybersource",
                "clientToken": "setup-jwt",
                "config": { "testMode": true, "is3dsEnabled": true }
            })))
            .mount(&server)
            .await;

        let store = store(&server).await;
        let snapshot = store
            .dispatch(CheckoutAction::LoadPaymentMethod {
                method_id: "cybersource".into(),
            })
            .await
            .unwrap();

        let method = snapshot.payment_method("cybersource").unwrap();
        assert_eq!(method.client_token.as_deref(), Some("setup-jwt"));
        assert!(method.config.is_3ds_enabled);
        assert_eq!(store.state(), snapshot);
    }

    #[tokio::test]
    async fn test_unknown_payment_method() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = store(&server)
            .await
            .dispatch(CheckoutAction::LoadPaymentMethod {
                method_id: "square".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::MissingConfiguration(_)));
    }

    #[tokio::test]
    async fn test_load_checkout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/storefront/checkouts/c-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "c-1",
                "cart": { "id": "cart-1", "currency": "EUR", "grandTotal": 4250 },
                "orderId": "101"
            })))
            .mount(&server)
            .await;

        let snapshot = store(&server)
            .await
            .dispatch(CheckoutAction::LoadCheckout {
                checkout_id: "c-1".into(),
            })
            .await
            .unwrap();

        assert_eq!(snapshot.checkout_id.as_deref(), Some("c-1"));
        assert_eq!(snapshot.order_id.as_deref(), Some("101"));
        let cart = snapshot.cart.unwrap();
        assert_eq!(cart.currency, Currency::EUR);
        assert_eq!(cart.grand_total, 4250);
    }
}
