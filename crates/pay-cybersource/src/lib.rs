//! # pay-cybersource
//!
//! CyberSource card payments with Cardinal Cruise 3-D Secure.
//!
//! ## Features
//!
//! - Songbird script loading for test and production
//! - Typed Cardinal events routed through an `EventTable`
//! - `ThreeDSecureOrchestrator`: setup, BIN detection, issuer challenge and
//!   the validation decision table
//! - `CyberSourcePaymentAdapter`: 3DS or plain card processing per method
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_cybersource::{CyberSourceConfig, CyberSourcePaymentAdapter, CyberSourceScriptLoader};
//! use pay_core::Strategy;
//!
//! let adapter = CyberSourcePaymentAdapter::new(
//!     store.clone(),
//!     coordinator,
//!     CyberSourceScriptLoader::new(script_host),
//!     CyberSourceConfig::from_env()?,
//! );
//! let strategy = Strategy::boxed(adapter, store);
//! ```

pub mod authentication;
pub mod cardinal;
pub mod config;
pub mod decision;
pub mod processor;
pub mod script;
pub mod session;
pub mod strategy;
pub mod threedsecure;

#[cfg(test)]
mod mock;

pub use authentication::{AuthenticationSession, PendingValidation, SessionState};
pub use cardinal::{
    ActionCode, BinProcessResponse, CardinalConfiguration, CardinalEventType,
    CardinalTriggerEvent, ContinueObject, OrderDetails, PartialOrder, PaymentBrand,
    SetupCompletedData, ValidatedData,
};
pub use config::CyberSourceConfig;
pub use decision::{decide, ValidationDecision, SIGNATURE_VALIDATION_ERRORS};
pub use processor::CyberSourcePaymentProcessor;
pub use script::{CardinalScriptHost, CyberSourceScriptLoader};
pub use session::{CardinalEvent, CardinalSession, EventListener, EventTable, SessionHandle};
pub use strategy::{CyberSourcePaymentAdapter, ProcessorKind};
pub use threedsecure::ThreeDSecureOrchestrator;
