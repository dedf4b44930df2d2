//! # Payment Error Types
//!
//! Typed error handling for the lightning-checkout strategies.
//! All strategy operations return `Result<T, PaymentError>`.
//!
//! Provider and event outcomes are translated into this taxonomy at the
//! adapter boundary. Errors returned by the submission coordinator pass
//! through unchanged.

use thiserror::Error;

/// Core error type for all payment operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// A required configuration field is absent (method id, client token...)
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    /// Operation needs a completed `initialize()` or a live session handle
    #[error("Not initialized: {0}")]
    NotInitialized(String),

    /// The issuer rejected the cardholder authentication
    #[error("Authentication failed: {description}")]
    AuthenticationFailed { description: String },

    /// Authentication ended without a usable result
    #[error("Authentication incomplete (error {error_number})")]
    AuthenticationIncomplete { error_number: i64 },

    /// The authentication service reported a protocol error
    #[error("Authentication protocol error {error_number}")]
    AuthenticationProtocol { error_number: i64 },

    /// No validation outcome arrived before the configured deadline
    #[error("Authentication timed out after {after_secs} seconds")]
    AuthenticationTimedOut { after_secs: u64 },

    /// Backend rejected the order submission
    #[error("Order submission failed: {0}")]
    OrderSubmission(String),

    /// Backend rejected the payment submission
    #[error("Payment submission failed: {0}")]
    PaymentSubmission(String),

    /// The strategy has no post-payment confirmation step
    #[error("Order finalization is not required for this payment method")]
    OrderFinalizationNotRequired,

    /// Registry lookup for an unknown strategy key
    #[error("Strategy not found: {key}")]
    NotFound { key: String },

    /// Invalid request data
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Payment provider script or SDK error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with the backend
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Returns true if re-invoking `execute()` may succeed.
    ///
    /// Failed and incomplete authentications are hard stops: the shopper
    /// has to pick another payment method.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::AuthenticationProtocol { .. }
                | PaymentError::AuthenticationTimedOut { .. }
                | PaymentError::NetworkError(_)
        )
    }

    /// Stable machine-readable code for the checkout UI
    pub fn error_code(&self) -> &'static str {
        match self {
            PaymentError::MissingConfiguration(_) => "missing_configuration",
            PaymentError::NotInitialized(_) => "not_initialized",
            PaymentError::AuthenticationFailed { .. } => "authentication_failed",
            PaymentError::AuthenticationIncomplete { .. } => "authentication_incomplete",
            PaymentError::AuthenticationProtocol { .. } => "authentication_protocol_error",
            PaymentError::AuthenticationTimedOut { .. } => "authentication_timed_out",
            PaymentError::OrderSubmission(_) => "order_submission_failed",
            PaymentError::PaymentSubmission(_) => "payment_submission_failed",
            PaymentError::OrderFinalizationNotRequired => "order_finalization_not_required",
            PaymentError::NotFound { .. } => "not_found",
            PaymentError::InvalidArgument(_) => "invalid_argument",
            PaymentError::ProviderError { .. } => "provider_error",
            PaymentError::NetworkError(_) => "network_error",
            PaymentError::Serialization(_) => "serialization_error",
            PaymentError::Internal(_) => "internal_error",
        }
    }

    /// Shorthand for a payment-method-scoped `NotInitialized`
    pub fn payment_not_initialized() -> Self {
        PaymentError::NotInitialized("payment strategy has not been initialized".to_string())
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(err: serde_json::Error) -> Self {
        PaymentError::Serialization(err.to_string())
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
