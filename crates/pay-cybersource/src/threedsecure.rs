//! # CyberSource 3-D Secure Orchestrator
//!
//! Drives the Cardinal Cruise handshake around a card payment:
//!
//! ```text
//! initialize:  load script ║ load payment method
//!              configure → on(setupComplete, validated) → setup(jwt)
//!
//! execute:     register pending → [jwt.update] → bin.process
//!              → [order.update → continue(cca)] → await validated
//!              → decide → submit order → submit payment (+ 3DS token)
//!
//! deinitialize: deactivate → off(setupComplete, validated)
//! ```
//!
//! The listener handed to Cardinal is built once per orchestrator from a
//! weak reference to the shared session state, so repeated initialization
//! never stacks subscriptions and events arriving after teardown are inert.

use crate::authentication::{AuthenticationSession, SessionState};
use crate::cardinal::{
    CardinalEventType, CardinalTriggerEvent, ContinueObject, OrderDetails, PartialOrder,
    PaymentBrand,
};
use crate::config::CyberSourceConfig;
use crate::decision::{decide, ValidationDecision};
use crate::script::CyberSourceScriptLoader;
use crate::session::{EventListener, SessionHandle};
use async_trait::async_trait;
use pay_core::{
    submit_order_and_payment, CheckoutAction, CheckoutSnapshot, CheckoutStore, InitializeOptions,
    OrderPayload, PaymentData, PaymentError, PaymentInstrument, PaymentResult, ProtocolAdapter,
    RequestOptions, SharedSubmissionCoordinator, StepUpChallenge,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Provider name of the 3-D Secure orchestrator
pub const PROVIDER_NAME: &str = "cybersource-3ds";

#[derive(Clone)]
struct ActiveSession {
    handle: SessionHandle,
    method_id: String,
    /// Token the session was set up (or last updated) with
    setup_token: String,
}

/// 3-D Secure protocol adapter for CyberSource card payments
pub struct ThreeDSecureOrchestrator {
    store: Arc<dyn CheckoutStore>,
    coordinator: SharedSubmissionCoordinator,
    loader: CyberSourceScriptLoader,
    config: CyberSourceConfig,
    state: Arc<SessionState>,
    listener: EventListener,
    session: Mutex<Option<ActiveSession>>,
    last_authentication: Mutex<Option<AuthenticationSession>>,
}

impl ThreeDSecureOrchestrator {
    pub fn new(
        store: Arc<dyn CheckoutStore>,
        coordinator: SharedSubmissionCoordinator,
        loader: CyberSourceScriptLoader,
        config: CyberSourceConfig,
    ) -> Self {
        let state = Arc::new(SessionState::new());
        let weak = Arc::downgrade(&state);
        let listener: EventListener = Arc::new(move |event| {
            if let Some(state) = weak.upgrade() {
                state.handle(event);
            }
        });

        Self {
            store,
            coordinator,
            loader,
            config,
            state,
            listener,
            session: Mutex::new(None),
            last_authentication: Mutex::new(None),
        }
    }

    /// Shared session state (setup status, pending validation)
    pub fn session_state(&self) -> &Arc<SessionState> {
        &self.state
    }

    pub fn is_session_active(&self) -> bool {
        self.session.lock().is_some()
    }

    /// Record of the most recent attempt that received an outcome
    pub fn last_authentication(&self) -> Option<AuthenticationSession> {
        self.last_authentication.lock().clone()
    }

    fn resolve_test_mode(&self, options: &InitializeOptions) -> bool {
        options
            .test_mode
            .or_else(|| {
                self.store
                    .state()
                    .payment_method(&options.method_id)
                    .map(|m| m.config.test_mode)
            })
            .unwrap_or(false)
    }

    fn teardown(&self, handle: &SessionHandle) {
        self.state.deactivate();
        for event in CardinalEventType::ALL {
            handle.off(event);
        }
    }

    /// Order details sent with `order.update` and `Cardinal.continue`
    fn partial_order(&self, challenge: &StepUpChallenge) -> PartialOrder {
        let snapshot = self.store.state();
        let cart = snapshot.cart.as_ref();

        PartialOrder {
            order_details: OrderDetails {
                order_number: challenge.order_number.clone().or(snapshot.order_id.clone()),
                amount: cart.map(|c| c.grand_total),
                currency_code: cart.map(|c| c.currency.numeric_code().to_string()),
                order_channel: challenge.order_channel.clone(),
                transaction_id: challenge.transaction_id.clone(),
            },
        }
    }

    /// Re-send the setup token when the store holds a newer one
    async fn refresh_token(&self, active: &ActiveSession) -> PaymentResult<()> {
        let current = self
            .store
            .state()
            .payment_method(&active.method_id)
            .and_then(|m| m.client_token.clone())
            .filter(|token| !token.is_empty() && *token != active.setup_token);

        if let Some(token) = current {
            debug!("Client token changed since setup, updating Cardinal");
            active
                .handle
                .trigger(
                    CardinalTriggerEvent::JwtUpdate,
                    Some(serde_json::Value::String(token.clone())),
                )
                .await?;

            if let Some(session) = self.session.lock().as_mut() {
                session.setup_token = token;
            }
        }
        Ok(())
    }

    async fn process_bin(&self, handle: &SessionHandle, bin: String) -> PaymentResult<()> {
        match handle
            .trigger(
                CardinalTriggerEvent::BinProcess,
                Some(serde_json::Value::String(bin)),
            )
            .await
        {
            Ok(response) => {
                debug!(status = ?response.map(|r| r.status), "BIN processed");
                Ok(())
            }
            Err(err @ PaymentError::NotInitialized(_)) => Err(err),
            Err(err) => {
                warn!(error = %err, "BIN detection failed, continuing");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl ProtocolAdapter for ThreeDSecureOrchestrator {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    #[instrument(skip(self, options), fields(method_id = %options.method_id))]
    async fn initialize(&self, options: &InitializeOptions) -> PaymentResult<CheckoutSnapshot> {
        if self.is_session_active() {
            debug!("Cardinal session already set up");
            return Ok(self.store.state());
        }

        let test_mode = self.resolve_test_mode(options);
        let (handle, snapshot) = tokio::try_join!(
            self.loader.load(test_mode),
            self.store.dispatch(CheckoutAction::LoadPaymentMethod {
                method_id: options.method_id.clone(),
            })
        )?;

        let method = snapshot.payment_method(&options.method_id).ok_or_else(|| {
            PaymentError::MissingConfiguration(format!(
                "payment method {} is not available",
                options.method_id
            ))
        })?;

        let setup_token = method
            .client_token
            .clone()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                PaymentError::MissingConfiguration(format!(
                    "payment method {} has no client token",
                    options.method_id
                ))
            })?;

        handle.configure(&self.config.cardinal_configuration())?;

        self.state.activate();
        for event in CardinalEventType::ALL {
            handle.on(event, Arc::clone(&self.listener));
        }

        if let Err(err) = handle.setup(&setup_token) {
            self.teardown(&handle);
            return Err(err);
        }

        *self.session.lock() = Some(ActiveSession {
            handle,
            method_id: options.method_id.clone(),
            setup_token,
        });

        info!(test_mode, "Cardinal session set up");
        Ok(snapshot)
    }

    #[instrument(skip(self, payload, options))]
    async fn execute(
        &self,
        payload: &OrderPayload,
        options: &RequestOptions,
    ) -> PaymentResult<CheckoutSnapshot> {
        let active = self
            .session
            .lock()
            .clone()
            .ok_or_else(PaymentError::payment_not_initialized)?;

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

        let mut authentication = AuthenticationSession::begin(self.state.session_id());
        // Parked before any trigger so a synchronous outcome is not lost
        let pending = SessionState::register(&self.state, authentication.id);

        if !self.state.is_setup_complete() {
            warn!("Cardinal setup has not completed yet, continuing");
        }

        self.refresh_token(&active).await?;
        self.process_bin(&active.handle, card.bin()).await?;

        if let Some(challenge) = &options.challenge {
            let order = self.partial_order(challenge);
            active
                .handle
                .trigger(
                    CardinalTriggerEvent::OrderUpdate,
                    Some(serde_json::to_value(&order)?),
                )
                .await?;

            let continue_object = ContinueObject {
                acs_url: challenge.acs_url.clone(),
                payload: challenge.payload.clone(),
            };
            debug!(transaction_id = %challenge.transaction_id, "Continuing to issuer challenge");
            active
                .handle
                .continue_challenge(PaymentBrand::Cca, &continue_object, &order)?;
        }

        let data = pending.wait(self.config.validation_timeout).await?;
        // Setup may complete while the attempt is in flight
        authentication.session_id = self.state.session_id();
        authentication.record(&data);
        *self.last_authentication.lock() = Some(authentication.clone());

        let decision = decide(&data)?;
        info!(
            attempt = %authentication.id,
            session_id = ?authentication.session_id,
            action_code = ?authentication.action_code,
            error_number = authentication.error_number,
            elapsed_ms = authentication.elapsed().num_milliseconds(),
            "Authentication completed"
        );

        let card = match (&decision, decision.processor_transaction_id()) {
            (_, Some(transaction_id)) => card.with_three_d_secure(transaction_id),
            (ValidationDecision::Authenticated { .. }, None) => {
                warn!("Authenticated without a processor transaction id");
                card
            }
            (ValidationDecision::StepUpNotRequired, None) => card,
        };

        let instrument = PaymentInstrument {
            method_id: payment.method_id.clone(),
            gateway_id: payment.gateway_id.clone(),
            payment_data: PaymentData::CreditCard(card),
        };

        submit_order_and_payment(self.coordinator.as_ref(), payload, &instrument, options).await?;

        info!("Order and payment submitted");
        Ok(self.store.state())
    }

    #[instrument(skip(self))]
    async fn deinitialize(&self) -> PaymentResult<CheckoutSnapshot> {
        let active = self.session.lock().take();

        match active {
            Some(active) => self.teardown(&active.handle),
            None => self.state.deactivate(),
        }

        debug!("Cardinal session torn down");
        Ok(self.store.state())
    }
}
