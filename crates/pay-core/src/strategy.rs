//! # Payment Strategy Lifecycle
//!
//! Core Strategy pattern for payment providers. Every provider runs behind
//! the same four-operation lifecycle:
//!
//! ```text
//!   UNINITIALIZED ──initialize()──▶ INITIALIZED ──deinitialize()──▶ UNINITIALIZED
//!                                       │
//!                                  execute() / finalize()
//! ```
//!
//! ## Design Pattern
//!
//! `Strategy<A>` owns the lifecycle state and its guards. The provider
//! behaviour lives in a `ProtocolAdapter`; adapters are peers, none of them
//! overrides part of another.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 PaymentStrategy (dyn trait)                 │
//! │  ├── initialize()   ├── execute()                           │
//! │  ├── finalize()     └── deinitialize()                      │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                   Strategy<A: ProtocolAdapter>
//!          ┌─────────────────┼─────────────────┐
//!  ┌───────┴───────┐ ┌───────┴───────┐ ┌───────┴───────┐
//!  │  CyberSource  │ │ ThreeDSecure  │ │    Wallet     │
//!  │    Adapter    │ │ Orchestrator  │ │    Adapter    │
//!  └───────────────┘ └───────────────┘ └───────────────┘
//! ```

use crate::error::{PaymentError, PaymentResult};
use crate::order::OrderPayload;
use crate::store::{CheckoutSnapshot, CheckoutStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Options passed to `initialize()`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeOptions {
    /// Payment method identifier (required)
    pub method_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_id: Option<String>,

    /// Overrides the payment method's own test mode flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_mode: Option<bool>,
}

impl InitializeOptions {
    pub fn new(method_id: impl Into<String>) -> Self {
        Self {
            method_id: method_id.into(),
            gateway_id: None,
            test_mode: None,
        }
    }

    /// Builder: force test mode on or off
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = Some(test_mode);
        self
    }

    /// Fails when the method id is empty
    pub fn validate(&self) -> PaymentResult<()> {
        if self.method_id.trim().is_empty() {
            return Err(PaymentError::MissingConfiguration(
                "methodId is required to initialize a payment strategy".to_string(),
            ));
        }
        Ok(())
    }
}

/// Issuer challenge details obtained from an authentication lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepUpChallenge {
    /// Access control server URL
    pub acs_url: String,
    /// Encoded challenge request for the ACS
    pub payload: String,
    pub transaction_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_channel: Option<String>,
}

/// Options passed to `execute()`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_id: Option<String>,

    /// Present when the issuer requires an interactive challenge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<StepUpChallenge>,
}

impl RequestOptions {
    /// Builder: attach a step-up challenge
    pub fn with_challenge(mut self, challenge: StepUpChallenge) -> Self {
        self.challenge = Some(challenge);
        self
    }
}

/// Provider-specific half of a strategy.
///
/// `Strategy<A>` guarantees `execute` only runs after a successful
/// `initialize`, and that `initialize`/`deinitialize` are not repeated.
#[async_trait]
pub trait ProtocolAdapter: Send + Sync {
    /// Provider name (for logging and routing)
    fn provider_name(&self) -> &'static str;

    /// Prepare provider scripts and sessions
    async fn initialize(&self, options: &InitializeOptions) -> PaymentResult<CheckoutSnapshot>;

    /// Run the provider protocol and submit the order and payment
    async fn execute(
        &self,
        payload: &OrderPayload,
        options: &RequestOptions,
    ) -> PaymentResult<CheckoutSnapshot>;

    /// Post-payment confirmation. Most providers have none.
    async fn finalize(&self) -> PaymentResult<CheckoutSnapshot> {
        Err(PaymentError::OrderFinalizationNotRequired)
    }

    /// Release event subscriptions and session resources
    async fn deinitialize(&self) -> PaymentResult<CheckoutSnapshot>;
}

/// Uniform lifecycle every registered strategy exposes
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn initialize(&self, options: &InitializeOptions) -> PaymentResult<CheckoutSnapshot>;

    async fn execute(
        &self,
        payload: &OrderPayload,
        options: &RequestOptions,
    ) -> PaymentResult<CheckoutSnapshot>;

    async fn finalize(&self) -> PaymentResult<CheckoutSnapshot>;

    async fn deinitialize(&self) -> PaymentResult<CheckoutSnapshot>;

    fn is_initialized(&self) -> bool;
}

/// Type alias for a boxed payment strategy (dynamic dispatch)
pub type BoxedPaymentStrategy = Arc<dyn PaymentStrategy>;

/// Lifecycle state of a strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
}

/// Generic lifecycle wrapper around a protocol adapter
pub struct Strategy<A> {
    adapter: A,
    store: Arc<dyn CheckoutStore>,
    /// Source of truth, held across adapter calls
    state: Mutex<LifecycleState>,
    /// Lock-free mirror of `state` for `is_initialized`, written under the lock
    initialized: AtomicBool,
}

impl<A: ProtocolAdapter> Strategy<A> {
    pub fn new(adapter: A, store: Arc<dyn CheckoutStore>) -> Self {
        Self {
            adapter,
            store,
            state: Mutex::new(LifecycleState::Uninitialized),
            initialized: AtomicBool::new(false),
        }
    }

    /// Wrap into a shareable trait object
    pub fn boxed(adapter: A, store: Arc<dyn CheckoutStore>) -> BoxedPaymentStrategy
    where
        A: 'static,
    {
        Arc::new(Self::new(adapter, store))
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    fn set_flag(&self, initialized: bool) {
        self.initialized.store(initialized, Ordering::SeqCst);
    }
}

#[async_trait]
impl<A: ProtocolAdapter> PaymentStrategy for Strategy<A> {
    fn provider_name(&self) -> &'static str {
        self.adapter.provider_name()
    }

    #[instrument(skip(self, options), fields(provider = self.adapter.provider_name(), method_id = %options.method_id))]
    async fn initialize(&self, options: &InitializeOptions) -> PaymentResult<CheckoutSnapshot> {
        options.validate()?;

        // Held across the adapter call so concurrent callers cannot both load
        let mut state = self.state.lock().await;
        if *state == LifecycleState::Initialized {
            debug!("Strategy already initialized, skipping");
            return Ok(self.store.state());
        }

        let snapshot = self.adapter.initialize(options).await?;
        *state = LifecycleState::Initialized;
        self.set_flag(true);

        info!("Payment strategy initialized");
        Ok(snapshot)
    }

    #[instrument(skip(self, payload, options), fields(provider = self.adapter.provider_name()))]
    async fn execute(
        &self,
        payload: &OrderPayload,
        options: &RequestOptions,
    ) -> PaymentResult<CheckoutSnapshot> {
        if *self.state.lock().await != LifecycleState::Initialized {
            return Err(PaymentError::payment_not_initialized());
        }

        self.adapter.execute(payload, options).await
    }

    async fn finalize(&self) -> PaymentResult<CheckoutSnapshot> {
        self.adapter.finalize().await
    }

    #[instrument(skip(self), fields(provider = self.adapter.provider_name()))]
    async fn deinitialize(&self) -> PaymentResult<CheckoutSnapshot> {
        let mut state = self.state.lock().await;
        if *state == LifecycleState::Uninitialized {
            return Ok(self.store.state());
        }

        let snapshot = self.adapter.deinitialize().await?;
        *state = LifecycleState::Uninitialized;
        self.set_flag(false);

        info!("Payment strategy deinitialized");
        Ok(snapshot)
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCheckoutStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingAdapter {
        initialized: AtomicUsize,
        executed: AtomicUsize,
        deinitialized: AtomicUsize,
    }

    #[async_trait]
    impl ProtocolAdapter for CountingAdapter {
        fn provider_name(&self) -> &'static str {
            "counting"
        }

        async fn initialize(&self, _options: &InitializeOptions) -> PaymentResult<CheckoutSnapshot> {
            self.initialized.fetch_add(1, Ordering::SeqCst);
            Ok(CheckoutSnapshot::default())
        }

        async fn execute(
            &self,
            _payload: &OrderPayload,
            _options: &RequestOptions,
        ) -> PaymentResult<CheckoutSnapshot> {
            self.executed.fetch_add(1, Ordering::SeqCst);
            Ok(CheckoutSnapshot::default())
        }

        async fn deinitialize(&self) -> PaymentResult<CheckoutSnapshot> {
            self.deinitialized.fetch_add(1, Ordering::SeqCst);
            Ok(CheckoutSnapshot::default())
        }
    }

    fn strategy() -> Strategy<CountingAdapter> {
        Strategy::new(
            CountingAdapter::default(),
            Arc::new(MemoryCheckoutStore::default()),
        )
    }

    #[tokio::test]
    async fn test_execute_before_initialize_fails() {
        let strategy = strategy();

        let err = strategy
            .execute(&OrderPayload::default(), &RequestOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::NotInitialized(_)));
        assert_eq!(strategy.adapter().executed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_initialize_requires_method_id() {
        let strategy = strategy();

        let err = strategy
            .initialize(&InitializeOptions::new("  "))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::MissingConfiguration(_)));
        assert!(!strategy.is_initialized());
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let strategy = strategy();
        let options = InitializeOptions::new("counting");

        strategy.initialize(&options).await.unwrap();
        strategy.initialize(&options).await.unwrap();

        assert_eq!(strategy.adapter().initialized.load(Ordering::SeqCst), 1);
        assert!(strategy.is_initialized());
    }

    #[tokio::test]
    async fn test_deinitialize_allows_reinitialization() {
        let strategy = strategy();
        let options = InitializeOptions::new("counting");

        strategy.initialize(&options).await.unwrap();
        strategy.deinitialize().await.unwrap();
        strategy.deinitialize().await.unwrap();
        assert!(!strategy.is_initialized());
        assert_eq!(strategy.adapter().deinitialized.load(Ordering::SeqCst), 1);

        let err = strategy
            .execute(&OrderPayload::default(), &RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::NotInitialized(_)));

        strategy.initialize(&options).await.unwrap();
        strategy
            .execute(&OrderPayload::default(), &RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(strategy.adapter().initialized.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_default_finalize_not_required() {
        let strategy = strategy();
        strategy
            .initialize(&InitializeOptions::new("counting"))
            .await
            .unwrap();

        assert_eq!(
            strategy.finalize().await.unwrap_err(),
            PaymentError::OrderFinalizationNotRequired
        );
    }
}
