//! # Validation Decision Table
//!
//! Maps a `payments.validated` outcome to either "proceed with submission"
//! or a taxonomy error. Total over every action code and error number.
//!
//! | ActionCode | condition                      | outcome                        |
//! |------------|--------------------------------|--------------------------------|
//! | SUCCESS    |                                | proceed, attach transaction id |
//! | NOACTION   | error ∈ signature validation   | proceed, no transaction id     |
//! | NOACTION   | otherwise                      | `AuthenticationIncomplete`     |
//! | FAILURE    |                                | `AuthenticationFailed`         |
//! | ERROR      |                                | `AuthenticationProtocol`       |
//! | missing / unknown                           | `AuthenticationProtocol`       |

use crate::cardinal::{ActionCode, ValidatedData};
use pay_core::{PaymentError, PaymentResult};

/// Error numbers meaning the issuer does not require step-up
pub const SIGNATURE_VALIDATION_ERRORS: [i64; 4] = [100004, 1010, 1011, 1020];

pub fn is_signature_validation_error(error_number: i64) -> bool {
    SIGNATURE_VALIDATION_ERRORS.contains(&error_number)
}

/// Outcome that allows order and payment submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationDecision {
    /// Cardholder authenticated
    Authenticated {
        processor_transaction_id: Option<String>,
    },
    /// Issuer does not require step-up
    StepUpNotRequired,
}

impl ValidationDecision {
    /// Transaction id to attach to the payment instrument
    pub fn processor_transaction_id(&self) -> Option<&str> {
        match self {
            ValidationDecision::Authenticated {
                processor_transaction_id,
            } => processor_transaction_id.as_deref(),
            ValidationDecision::StepUpNotRequired => None,
        }
    }
}

/// Decide what a validation outcome means for the order
pub fn decide(data: &ValidatedData) -> PaymentResult<ValidationDecision> {
    match data.action_code {
        Some(ActionCode::Success) => Ok(ValidationDecision::Authenticated {
            processor_transaction_id: data.processor_transaction_id().map(str::to_string),
        }),
        Some(ActionCode::NoAction) if is_signature_validation_error(data.error_number) => {
            Ok(ValidationDecision::StepUpNotRequired)
        }
        Some(ActionCode::NoAction) => Err(PaymentError::AuthenticationIncomplete {
            error_number: data.error_number,
        }),
        Some(ActionCode::Failure) => Err(PaymentError::AuthenticationFailed {
            description: data.error_description.clone(),
        }),
        Some(ActionCode::Error) | Some(ActionCode::Unknown) | None => {
            Err(PaymentError::AuthenticationProtocol {
                error_number: data.error_number,
            })
        }
    }
}
