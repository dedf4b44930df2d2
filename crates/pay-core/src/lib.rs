//! # pay-core
//!
//! Core types and traits for the lightning-checkout payment strategies.
//!
//! This crate provides:
//! - `PaymentStrategy` and the generic `Strategy<A: ProtocolAdapter>` lifecycle
//! - `Registry` for lazily built, memoized strategies
//! - `CheckoutStore` and `SubmissionCoordinator` seams to the checkout backend
//! - `OrderPayload` and `PaymentInstrument` request bodies
//! - `WalletPaymentAdapter` for token-returning wallet providers
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{InitializeOptions, OrderPayload, RequestOptions};
//!
//! // Strategies are built on first lookup and memoized per key
//! let strategy = registry.get("cybersource")?;
//!
//! strategy.initialize(&InitializeOptions::new("cybersource")).await?;
//! strategy.execute(&payload, &RequestOptions::default()).await?;
//! strategy.deinitialize().await?;
//! ```

pub mod error;
pub mod money;
pub mod order;
pub mod registry;
pub mod store;
pub mod strategy;
pub mod submission;
pub mod wallet;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-exports for convenience
pub use error::{PaymentError, PaymentResult};
pub use money::{Currency, Money};
pub use order::{
    CardExpiry, CardInformation, CreditCardInstrument, NonceInstrument, OrderPayload,
    OrderPaymentRequestBody, PaymentData, PaymentInstrument, ThreeDSecureToken,
};
pub use registry::{PaymentStrategyRegistry, Registry};
pub use store::{
    Cart, CheckoutAction, CheckoutSnapshot, CheckoutStore, MemoryCheckoutStore, PaymentMethod,
    PaymentMethodConfig,
};
pub use strategy::{
    BoxedPaymentStrategy, InitializeOptions, LifecycleState, PaymentStrategy, ProtocolAdapter,
    RequestOptions, StepUpChallenge, Strategy,
};
pub use submission::{submit_order_and_payment, SharedSubmissionCoordinator, SubmissionCoordinator};
pub use wallet::{ButtonHandle, TokenizedPaymentData, WalletPaymentAdapter, WalletProcessor};
