//! # pay-api
//!
//! Checkout backend integration for lightning-checkout.
//!
//! This crate provides:
//! - `HttpCheckoutStore`: payment methods and checkouts from the storefront
//! - `HttpSubmissionCoordinator`: order and payment submission
//! - `create_payment_strategy_registry`: the default strategy registry
//!
//! ## Endpoints used
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | POST | `/internalapi/v1/checkout/order` | Submit order |
//! | POST | `/api/public/v1/orders/payments` | Submit payment (payments host) |
//! | GET | `/api/storefront/payments/:methodId` | Load payment method |
//! | GET | `/api/storefront/checkouts/:checkoutId` | Load checkout |

pub mod client;
pub mod config;
pub mod registry;
pub mod store;
pub mod submission;

pub use client::CheckoutClient;
pub use config::BackendConfig;
pub use registry::{create_payment_strategy_registry, StrategyDependencies};
pub use store::HttpCheckoutStore;
pub use submission::HttpSubmissionCoordinator;
