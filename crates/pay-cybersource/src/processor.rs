//! # CyberSource Card Processor
//!
//! Card payments for methods without 3-D Secure: no script, no session,
//! just order then payment submission.

use async_trait::async_trait;
use pay_core::{
    submit_order_and_payment, CheckoutSnapshot, CheckoutStore, InitializeOptions, OrderPayload,
    PaymentData, PaymentError, PaymentInstrument, PaymentResult, ProtocolAdapter, RequestOptions,
    SharedSubmissionCoordinator,
};
use std::sync::Arc;
use tracing::{info, instrument};

pub const PROVIDER_NAME: &str = "cybersource-card";

/// Non-3DS card processor
pub struct CyberSourcePaymentProcessor {
    store: Arc<dyn CheckoutStore>,
    coordinator: SharedSubmissionCoordinator,
}

impl CyberSourcePaymentProcessor {
    pub fn new(store: Arc<dyn CheckoutStore>, coordinator: SharedSubmissionCoordinator) -> Self {
        Self { store, coordinator }
    }
}

#[async_trait]
impl ProtocolAdapter for CyberSourcePaymentProcessor {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn initialize(&self, _options: &InitializeOptions) -> PaymentResult<CheckoutSnapshot> {
        Ok(self.store.state())
    }

    #[instrument(skip(self, payload, options))]
    async fn execute(
        &self,
        payload: &OrderPayload,
        options: &RequestOptions,
    ) -> PaymentResult<CheckoutSnapshot> {
        let payment = payload
            .payment
            .as_ref()
            .ok_or_else(|| PaymentError::InvalidArgument("payment is required".to_string()))?;

        let card = payment
            .payment_data
            .as_ref()
            .and_then(PaymentData::credit_card)
            .cloned()
            .ok_or_else(|| {
                PaymentError::InvalidArgument("card payment data is required".to_string())
            })?;

        let instrument = PaymentInstrument {
            method_id: payment.method_id.clone(),
            gateway_id: payment.gateway_id.clone(),
            payment_data: PaymentData::CreditCard(card),
        };

        submit_order_and_payment(self.coordinator.as_ref(), payload, &instrument, options).await?;

        info!("Order and payment submitted");
        Ok(self.store.state())
    }

    async fn deinitialize(&self) -> PaymentResult<CheckoutSnapshot> {
        Ok(self.store.state())
    }
}
