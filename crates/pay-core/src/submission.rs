//! # Submission Coordinator
//!
//! Backend seam for the two outbound calls every strategy ends with:
//! order submission, then payment submission.

use crate::error::PaymentResult;
use crate::order::{OrderPayload, PaymentInstrument};
use crate::strategy::RequestOptions;
use async_trait::async_trait;
use std::sync::Arc;

/// Performs order and payment submission against the checkout backend.
///
/// Implementations report failures as `PaymentError::OrderSubmission` and
/// `PaymentError::PaymentSubmission`; strategies return them unchanged.
#[async_trait]
pub trait SubmissionCoordinator: Send + Sync {
    /// Submit the order (payment details already stripped)
    async fn submit_order(&self, order: &OrderPayload, options: &RequestOptions)
        -> PaymentResult<()>;

    /// Submit the payment for the order just created
    async fn submit_payment(&self, instrument: &PaymentInstrument) -> PaymentResult<()>;
}

/// Type alias for a shared coordinator
pub type SharedSubmissionCoordinator = Arc<dyn SubmissionCoordinator>;

/// Submit the order, then the payment. The payment is never attempted when
/// the order fails.
pub async fn submit_order_and_payment(
    coordinator: &dyn SubmissionCoordinator,
    payload: &OrderPayload,
    instrument: &PaymentInstrument,
    options: &RequestOptions,
) -> PaymentResult<()> {
    coordinator.submit_order(&payload.order_body(), options).await?;
    coordinator.submit_payment(instrument).await
}
