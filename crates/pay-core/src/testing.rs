//! Recording test doubles for strategy tests.
//!
//! Enabled for this crate's tests and, through the `testing` feature, for
//! downstream crates' tests.

use crate::error::{PaymentError, PaymentResult};
use crate::order::{OrderPayload, PaymentInstrument};
use crate::store::{CheckoutAction, CheckoutSnapshot, CheckoutStore, MemoryCheckoutStore};
use crate::strategy::RequestOptions;
use crate::submission::SubmissionCoordinator;
use async_trait::async_trait;
use parking_lot::Mutex;

/// One call received by `RecordingCoordinator`
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Order(OrderPayload),
    Payment(PaymentInstrument),
}

/// Coordinator that records calls and fails on demand
#[derive(Debug, Default)]
pub struct RecordingCoordinator {
    calls: Mutex<Vec<Submission>>,
    order_error: Mutex<Option<PaymentError>>,
    payment_error: Mutex<Option<PaymentError>>,
}

impl RecordingCoordinator {
    /// Make every order submission fail with `error`
    pub fn fail_orders_with(&self, error: PaymentError) {
        *self.order_error.lock() = Some(error);
    }

    /// Make every payment submission fail with `error`
    pub fn fail_payments_with(&self, error: PaymentError) {
        *self.payment_error.lock() = Some(error);
    }

    pub fn calls(&self) -> Vec<Submission> {
        self.calls.lock().clone()
    }

    pub fn payments(&self) -> Vec<PaymentInstrument> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Submission::Payment(p) => Some(p.clone()),
                Submission::Order(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl SubmissionCoordinator for RecordingCoordinator {
    async fn submit_order(
        &self,
        order: &OrderPayload,
        _options: &RequestOptions,
    ) -> PaymentResult<()> {
        self.calls.lock().push(Submission::Order(order.clone()));
        match self.order_error.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn submit_payment(&self, instrument: &PaymentInstrument) -> PaymentResult<()> {
        self.calls.lock().push(Submission::Payment(instrument.clone()));
        match self.payment_error.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// In-memory store that records dispatched actions
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: MemoryCheckoutStore,
    actions: Mutex<Vec<CheckoutAction>>,
}

impl RecordingStore {
    pub fn new(snapshot: CheckoutSnapshot) -> Self {
        Self {
            inner: MemoryCheckoutStore::new(snapshot),
            actions: Mutex::new(Vec::new()),
        }
    }

    /// The wrapped store, for updating the snapshot mid-test
    pub fn inner(&self) -> &MemoryCheckoutStore {
        &self.inner
    }

    pub fn actions(&self) -> Vec<CheckoutAction> {
        self.actions.lock().clone()
    }
}

#[async_trait]
impl CheckoutStore for RecordingStore {
    fn state(&self) -> CheckoutSnapshot {
        self.inner.state()
    }

    async fn dispatch(&self, action: CheckoutAction) -> PaymentResult<CheckoutSnapshot> {
        self.actions.lock().push(action.clone());
        self.inner.dispatch(action).await
    }
}
