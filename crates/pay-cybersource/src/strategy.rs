//! # CyberSource Payment Strategy
//!
//! Registered under `cybersource`. Picks the 3-D Secure orchestrator or the
//! plain card processor from the payment method's `is3dsEnabled` flag at
//! initialization and routes the rest of the lifecycle to it.

use crate::config::CyberSourceConfig;
use crate::processor::CyberSourcePaymentProcessor;
use crate::script::CyberSourceScriptLoader;
use crate::threedsecure::ThreeDSecureOrchestrator;
use async_trait::async_trait;
use pay_core::{
    CheckoutAction, CheckoutSnapshot, CheckoutStore, InitializeOptions, OrderPayload,
    PaymentError, PaymentResult, ProtocolAdapter, RequestOptions, SharedSubmissionCoordinator,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, instrument};

pub const PROVIDER_NAME: &str = "cybersource";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorKind {
    ThreeDSecure,
    Card,
}

/// Strategy adapter that selects a CyberSource processor per method
pub struct CyberSourcePaymentAdapter {
    store: Arc<dyn CheckoutStore>,
    three_d_secure: ThreeDSecureOrchestrator,
    card: CyberSourcePaymentProcessor,
    selected: Mutex<Option<ProcessorKind>>,
}

impl CyberSourcePaymentAdapter {
    pub fn new(
        store: Arc<dyn CheckoutStore>,
        coordinator: SharedSubmissionCoordinator,
        loader: CyberSourceScriptLoader,
        config: CyberSourceConfig,
    ) -> Self {
        Self {
            three_d_secure: ThreeDSecureOrchestrator::new(
                Arc::clone(&store),
                Arc::clone(&coordinator),
                loader,
                config,
            ),
            card: CyberSourcePaymentProcessor::new(Arc::clone(&store), coordinator),
            store,
            selected: Mutex::new(None),
        }
    }

    /// Processor chosen by the last initialization
    pub fn selected(&self) -> Option<ProcessorKind> {
        *self.selected.lock()
    }

    fn processor(&self, kind: ProcessorKind) -> &dyn ProtocolAdapter {
        match kind {
            ProcessorKind::ThreeDSecure => &self.three_d_secure,
            ProcessorKind::Card => &self.card,
        }
    }

    async fn select(&self, method_id: &str) -> PaymentResult<ProcessorKind> {
        let snapshot = self.store.state();
        let method = match snapshot.payment_method(method_id) {
            Some(method) => method.clone(),
            None => self
                .store
                .dispatch(CheckoutAction::LoadPaymentMethod {
                    method_id: method_id.to_string(),
                })
                .await?
                .payment_method(method_id)
                .cloned()
                .ok_or_else(|| {
                    PaymentError::MissingConfiguration(format!(
                        "payment method {} is not available",
                        method_id
                    ))
                })?,
        };

        Ok(if method.config.is_3ds_enabled {
            ProcessorKind::ThreeDSecure
        } else {
            ProcessorKind::Card
        })
    }
}

#[async_trait]
impl ProtocolAdapter for CyberSourcePaymentAdapter {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    #[instrument(skip(self, options), fields(method_id = %options.method_id))]
    async fn initialize(&self, options: &InitializeOptions) -> PaymentResult<CheckoutSnapshot> {
        let kind = self.select(&options.method_id).await?;
        debug!(processor = ?kind, "Selected CyberSource processor");

        let snapshot = self.processor(kind).initialize(options).await?;
        *self.selected.lock() = Some(kind);
        Ok(snapshot)
    }

    async fn execute(
        &self,
        payload: &OrderPayload,
        options: &RequestOptions,
    ) -> PaymentResult<CheckoutSnapshot> {
        let kind = self
            .selected()
            .ok_or_else(PaymentError::payment_not_initialized)?;
        self.processor(kind).execute(payload, options).await
    }

    /// Neither processor finalizes, selected or not
    async fn finalize(&self) -> PaymentResult<CheckoutSnapshot> {
        match self.selected() {
            Some(kind) => self.processor(kind).finalize().await,
            None => Err(PaymentError::OrderFinalizationNotRequired),
        }
    }

    async fn deinitialize(&self) -> PaymentResult<CheckoutSnapshot> {
        let kind = self.selected.lock().take();
        match kind {
            Some(kind) => self.processor(kind).deinitialize().await,
            None => Ok(self.store.state()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cardinal::{ActionCode, ValidatedData};
    use crate::mock::{MockCardinalSession, MockScriptHost};
    use pay_core::testing::{RecordingCoordinator, RecordingStore};
    use pay_core::{
        CreditCardInstrument, PaymentData, PaymentMethod, PaymentStrategy, Strategy,
    };

    fn strategy(
        method: PaymentMethod,
    ) -> (
        Strategy<CyberSourcePaymentAdapter>,
        Arc<MockCardinalSession>,
        Arc<RecordingStore>,
        Arc<RecordingCoordinator>,
    ) {
        let session = Arc::new(MockCardinalSession::new());
        let host = Arc::new(MockScriptHost::new(Arc::clone(&session)));
        let store = Arc::new(RecordingStore::new(CheckoutSnapshot {
            payment_methods: vec![method],
            ..CheckoutSnapshot::default()
        }));
        let coordinator = Arc::new(RecordingCoordinator::default());

        let adapter = CyberSourcePaymentAdapter::new(
            store.clone(),
            coordinator.clone(),
            CyberSourceScriptLoader::new(host),
            CyberSourceConfig::default(),
        );
        (Strategy::new(adapter, store.clone()), session, store, coordinator)
    }

    fn payload() -> OrderPayload {
        OrderPayload::with_payment(
            "cybersource",
            PaymentData::CreditCard(CreditCardInstrument::new(
                "4000000000001091",
                "01",
                "2031",
                "Jane Doe",
            )),
        )
    }

    #[tokio::test]
    async fn test_selects_three_d_secure() {
        let (strategy, session, _store, coordinator) = strategy(
            PaymentMethod::new("cybersource")
                .with_client_token("jwt")
                .with_3ds(true),
        );
        session.validate_on_bin(ValidatedData::new(ActionCode::Success).with_transaction_id("T"));

        strategy
            .initialize(&InitializeOptions::new("cybersource"))
            .await
            .unwrap();
        assert_eq!(strategy.adapter().selected(), Some(ProcessorKind::ThreeDSecure));

        strategy
            .execute(&payload(), &RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(coordinator.payments()[0].three_d_secure_token(), Some("T"));

        strategy.deinitialize().await.unwrap();
        assert!(strategy.adapter().selected().is_none());
        assert!(session.events.listener(crate::cardinal::CardinalEventType::Validated).is_none());
    }

    #[tokio::test]
    async fn test_selects_card_processor() {
        let (strategy, session, _store, coordinator) =
            strategy(PaymentMethod::new("cybersource").with_3ds(false));

        strategy
            .initialize(&InitializeOptions::new("cybersource"))
            .await
            .unwrap();
        assert_eq!(strategy.adapter().selected(), Some(ProcessorKind::Card));

        strategy
            .execute(&payload(), &RequestOptions::default())
            .await
            .unwrap();

        assert!(session.setups().is_empty());
        assert_eq!(coordinator.payments().len(), 1);
        assert_eq!(coordinator.payments()[0].three_d_secure_token(), None);
    }

    #[tokio::test]
    async fn test_unknown_method_loads_then_fails() {
        let (strategy, _session, store, _coordinator) =
            strategy(PaymentMethod::new("cybersource"));

        let err = strategy
            .initialize(&InitializeOptions::new("braintree"))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::MissingConfiguration(_)));
        assert_eq!(
            store.actions(),
            vec![CheckoutAction::LoadPaymentMethod {
                method_id: "braintree".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_finalize_not_required() {
        let (strategy, _session, _store, _coordinator) =
            strategy(PaymentMethod::new("cybersource"));
        strategy
            .initialize(&InitializeOptions::new("cybersource"))
            .await
            .unwrap();

        assert_eq!(
            strategy.finalize().await.unwrap_err(),
            PaymentError::OrderFinalizationNotRequired
        );
    }

    #[tokio::test]
    async fn test_finalize_not_required_without_selection() {
        let (strategy, _session, _store, _coordinator) = strategy(
            PaymentMethod::new("cybersource")
                .with_client_token("jwt")
                .with_3ds(true),
        );

        assert_eq!(
            strategy.finalize().await.unwrap_err(),
            PaymentError::OrderFinalizationNotRequired
        );

        strategy
            .initialize(&InitializeOptions::new("cybersource"))
            .await
            .unwrap();
        strategy.deinitialize().await.unwrap();

        assert_eq!(
            strategy.finalize().await.unwrap_err(),
            PaymentError::OrderFinalizationNotRequired
        );
    }
}
