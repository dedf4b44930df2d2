//! # Checkout State Store
//!
//! Read-only snapshot of the checkout (cart, payment methods, order) and the
//! `dispatch` seam through which strategies request async state transitions.
//!
//! The store is an external collaborator: strategies never mutate the
//! snapshot directly, they dispatch an action and read the snapshot the
//! store resolves with.

use crate::error::PaymentResult;
use crate::money::{Currency, Money};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Provider configuration flags of a payment method
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodConfig {
    /// Use the provider's sandbox endpoints
    #[serde(default)]
    pub test_mode: bool,

    /// Require 3-D Secure step-up for card payments
    #[serde(default, rename = "is3dsEnabled")]
    pub is_3ds_enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// A payment method as configured for the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,

    /// Setup token handed to the provider script (a signed JWT for Cardinal)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_token: Option<String>,

    #[serde(default)]
    pub config: PaymentMethodConfig,

    /// Provider-specific data (wallet nonces, card information...)
    #[serde(default)]
    pub initialization_data: serde_json::Value,
}

impl PaymentMethod {
    /// Create a payment method with default config
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            gateway: None,
            client_token: None,
            config: PaymentMethodConfig::default(),
            initialization_data: serde_json::Value::Null,
        }
    }

    /// Builder: set the client token
    pub fn with_client_token(mut self, token: impl Into<String>) -> Self {
        self.client_token = Some(token.into());
        self
    }

    /// Builder: set test mode
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.config.test_mode = test_mode;
        self
    }

    /// Builder: enable or disable 3-D Secure
    pub fn with_3ds(mut self, enabled: bool) -> Self {
        self.config.is_3ds_enabled = enabled;
        self
    }

    /// Builder: set initialization data
    pub fn with_initialization_data(mut self, data: serde_json::Value) -> Self {
        self.initialization_data = data;
        self
    }

    /// String field from the initialization data
    pub fn initialization_str(&self, key: &str) -> Option<&str> {
        self.initialization_data.get(key).and_then(|v| v.as_str())
    }
}

/// Cart totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: String,
    pub currency: Currency,
    /// Grand total in the smallest currency unit
    pub grand_total: i64,
}

impl Cart {
    pub fn total(&self) -> Money {
        Money::from_minor(self.grand_total, self.currency)
    }
}

/// Immutable view of the checkout state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart: Option<Cart>,

    /// Order id once the order has been submitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,

    #[serde(default)]
    pub payment_methods: Vec<PaymentMethod>,
}

impl CheckoutSnapshot {
    /// Look up a payment method by id
    pub fn payment_method(&self, method_id: &str) -> Option<&PaymentMethod> {
        self.payment_methods.iter().find(|m| m.id == method_id)
    }

    /// Insert or replace a payment method
    pub fn upsert_payment_method(&mut self, method: PaymentMethod) {
        match self.payment_methods.iter_mut().find(|m| m.id == method.id) {
            Some(existing) => *existing = method,
            None => self.payment_methods.push(method),
        }
    }
}

/// State transitions a strategy may request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutAction {
    /// Refresh a payment method (fresh client token, wallet nonce...)
    LoadPaymentMethod { method_id: String },
    /// Refresh the checkout and its cart
    LoadCheckout { checkout_id: String },
}

/// Checkout state store seam
#[async_trait]
pub trait CheckoutStore: Send + Sync {
    /// Current snapshot
    fn state(&self) -> CheckoutSnapshot;

    /// Perform an async state transition and resolve with the new snapshot
    async fn dispatch(&self, action: CheckoutAction) -> PaymentResult<CheckoutSnapshot>;
}

/// Store backed by a snapshot held in memory.
///
/// `dispatch` does no I/O: the snapshot is whatever the embedding
/// application last put in.
#[derive(Debug, Default)]
pub struct MemoryCheckoutStore {
    snapshot: RwLock<CheckoutSnapshot>,
}

impl MemoryCheckoutStore {
    pub fn new(snapshot: CheckoutSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
        }
    }

    /// Replace the whole snapshot
    pub fn replace(&self, snapshot: CheckoutSnapshot) {
        *self.snapshot.write() = snapshot;
    }

    /// Insert or replace one payment method
    pub fn set_payment_method(&self, method: PaymentMethod) {
        self.snapshot.write().upsert_payment_method(method);
    }
}

#[async_trait]
impl CheckoutStore for MemoryCheckoutStore {
    fn state(&self) -> CheckoutSnapshot {
        self.snapshot.read().clone()
    }

    async fn dispatch(&self, _action: CheckoutAction) -> PaymentResult<CheckoutSnapshot> {
        Ok(self.state())
    }
}
