//! # Wallet Adapters
//!
//! Providers that open a wallet sheet and read back a token (Google Pay and
//! friends) share one adapter. The provider SDK itself stays behind the
//! `WalletProcessor` seam.

use crate::error::{PaymentError, PaymentResult};
use crate::order::{CardInformation, NonceInstrument, OrderPayload, PaymentData, PaymentInstrument};
use crate::store::{CheckoutAction, CheckoutSnapshot, CheckoutStore};
use crate::strategy::{InitializeOptions, ProtocolAdapter, RequestOptions};
use crate::submission::{submit_order_and_payment, SubmissionCoordinator};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Token read back from a wallet sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizedPaymentData {
    pub nonce: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_information: Option<CardInformation>,
}

/// Handle to a rendered wallet button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonHandle {
    pub element_id: String,
}

/// Provider SDK surface for wallet payments
#[async_trait]
pub trait WalletProcessor: Send + Sync {
    async fn initialize(&self, method_id: &str) -> PaymentResult<()>;

    /// Show the wallet sheet and tokenize the shopper's choice
    async fn display_wallet(&self) -> PaymentResult<TokenizedPaymentData>;

    fn create_button(&self) -> PaymentResult<ButtonHandle>;

    async fn deinitialize(&self) -> PaymentResult<()>;
}

/// Lifecycle adapter for wallet providers
pub struct WalletPaymentAdapter {
    provider: &'static str,
    processor: Arc<dyn WalletProcessor>,
    store: Arc<dyn CheckoutStore>,
    coordinator: Arc<dyn SubmissionCoordinator>,
    method_id: Mutex<Option<String>>,
}

impl WalletPaymentAdapter {
    pub fn new(
        provider: &'static str,
        processor: Arc<dyn WalletProcessor>,
        store: Arc<dyn CheckoutStore>,
        coordinator: Arc<dyn SubmissionCoordinator>,
    ) -> Self {
        Self {
            provider,
            processor,
            store,
            coordinator,
            method_id: Mutex::new(None),
        }
    }

    /// Render the provider's wallet button
    pub fn create_button(&self) -> PaymentResult<ButtonHandle> {
        if self.method_id.lock().is_none() {
            return Err(PaymentError::payment_not_initialized());
        }
        self.processor.create_button()
    }

    fn stored_nonce(snapshot: &CheckoutSnapshot, method_id: &str) -> Option<NonceInstrument> {
        let method = snapshot.payment_method(method_id)?;
        let nonce = method.initialization_str("nonce")?.to_string();
        let card_information = method
            .initialization_data
            .get("card_information")
            .and_then(|v| serde_json::from_value(v.clone()).ok());

        Some(NonceInstrument {
            nonce,
            card_information,
        })
    }
}

#[async_trait]
impl ProtocolAdapter for WalletPaymentAdapter {
    fn provider_name(&self) -> &'static str {
        self.provider
    }

    async fn initialize(&self, options: &InitializeOptions) -> PaymentResult<CheckoutSnapshot> {
        self.processor.initialize(&options.method_id).await?;
        *self.method_id.lock() = Some(options.method_id.clone());
        Ok(self.store.state())
    }

    #[instrument(skip(self, payload, options), fields(provider = self.provider))]
    async fn execute(
        &self,
        payload: &OrderPayload,
        options: &RequestOptions,
    ) -> PaymentResult<CheckoutSnapshot> {
        let method_id = self
            .method_id
            .lock()
            .clone()
            .ok_or_else(PaymentError::payment_not_initialized)?;

        let snapshot = self
            .store
            .dispatch(CheckoutAction::LoadPaymentMethod {
                method_id: method_id.clone(),
            })
            .await?;

        if snapshot.payment_method(&method_id).is_none() {
            return Err(PaymentError::MissingConfiguration(format!(
                "payment method {} is not available",
                method_id
            )));
        }

        let nonce = match Self::stored_nonce(&snapshot, &method_id) {
            Some(nonce) => nonce,
            None => {
                debug!("No wallet token yet, displaying wallet");
                let tokenized = self.processor.display_wallet().await?;
                NonceInstrument {
                    nonce: tokenized.nonce,
                    card_information: tokenized.card_information,
                }
            }
        };

        let instrument = PaymentInstrument {
            method_id,
            gateway_id: payload.payment.as_ref().and_then(|p| p.gateway_id.clone()),
            payment_data: PaymentData::Nonce(nonce),
        };

        submit_order_and_payment(self.coordinator.as_ref(), payload, &instrument, options).await?;
        Ok(self.store.state())
    }

    async fn deinitialize(&self) -> PaymentResult<CheckoutSnapshot> {
        self.processor.deinitialize().await?;
        *self.method_id.lock() = None;
        Ok(self.store.state())
    }
}
