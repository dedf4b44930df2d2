//! # HTTP Submission Coordinator
//!
//! Submits the order to the storefront and the payment to the payments
//! service. Non-2xx answers become `OrderSubmission` / `PaymentSubmission`.

use crate::client::CheckoutClient;
use async_trait::async_trait;
use pay_core::{
    OrderPayload, PaymentError, PaymentInstrument, PaymentResult, RequestOptions,
    SubmissionCoordinator,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Serialize)]
struct PaymentRequest<'a> {
    payment: &'a PaymentInstrument,
}

/// Coordinator backed by the checkout backend
pub struct HttpSubmissionCoordinator {
    client: Arc<CheckoutClient>,
}

impl HttpSubmissionCoordinator {
    pub fn new(client: Arc<CheckoutClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SubmissionCoordinator for HttpSubmissionCoordinator {
    #[instrument(skip(self, order, _options))]
    async fn submit_order(
        &self,
        order: &OrderPayload,
        _options: &RequestOptions,
    ) -> PaymentResult<()> {
        let url = self.client.config().order_url();
        self.client
            .post_json(&url, order, |_, message| PaymentError::OrderSubmission(message))
            .await?;

        info!("Order submitted");
        Ok(())
    }

    #[instrument(skip(self, instrument), fields(method_id = %instrument.method_id))]
    async fn submit_payment(&self, instrument: &PaymentInstrument) -> PaymentResult<()> {
        let url = self.client.config().payment_url();
        self.client
            .post_json(
                &url,
                &PaymentRequest {
                    payment: instrument,
                },
                |_, message| PaymentError::PaymentSubmission(message),
            )
            .await?;

        info!(
            three_d_secure = instrument.three_d_secure_token().is_some(),
            "Payment submitted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use pay_core::{submit_order_and_payment, CreditCardInstrument, PaymentData};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn coordinator(server: &MockServer) -> HttpSubmissionCoordinator {
        let config = BackendConfig::new(server.uri()).with_payments_url(server.uri());
        HttpSubmissionCoordinator::new(Arc::new(CheckoutClient::new(config).unwrap()))
    }

    fn payload() -> OrderPayload {
        OrderPayload::with_payment(
            "cybersource",
            PaymentData::CreditCard(CreditCardInstrument::new(
                "4111111111111111",
                "10",
                "2030",
                "Jane Doe",
            )),
        )
    }

    fn instrument() -> PaymentInstrument {
        PaymentInstrument {
            method_id: "cybersource".into(),
            gateway_id: None,
            payment_data: PaymentData::CreditCard(
                CreditCardInstrument::new("4111111111111111", "10", "2030", "Jane Doe")
                    .with_three_d_secure("TXN1"),
            ),
        }
    }

    #[tokio::test]
    async fn test_submits_order_and_payment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/internalapi/v1/checkout/order"))
            .and(body_partial_json(json!({ "useStoreCredit": false })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 100 })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/public/v1/orders/payments"))
            .and(body_partial_json(json!({
                "payment": { "methodId": "cybersource", "paymentData": { "threeDSecure": { "token": "TXN1" } } }
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        submit_order_and_payment(
            &coordinator(&server),
            &payload(),
            &instrument(),
            &RequestOptions::default(),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_order_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/internalapi/v1/checkout/order"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "detail": "cart changed" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/public/v1/orders/payments"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let err = submit_order_and_payment(
            &coordinator(&server),
            &payload(),
            &instrument(),
            &RequestOptions::default(),
        )
        .await
        .unwrap_err();

        assert_eq!(err, PaymentError::OrderSubmission("HTTP 400: cart changed".into()));
    }

    #[tokio::test]
    async fn test_payment_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/public/v1/orders/payments"))
            .respond_with(ResponseTemplate::new(422).set_body_string("declined"))
            .mount(&server)
            .await;

        let err = coordinator(&server)
            .submit_payment(&instrument())
            .await
            .unwrap_err();

        assert_eq!(err, PaymentError::PaymentSubmission("HTTP 422: declined".into()));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let config = BackendConfig::new("http://127.0.0.1:9");
        let coordinator = HttpSubmissionCoordinator::new(Arc::new(CheckoutClient::new(config).unwrap()));

        let err = coordinator
            .submit_order(&payload(), &RequestOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::NetworkError(_)));
    }
}
