//! # Order Types
//!
//! Request bodies handed to the submission coordinator: the order payload
//! the checkout page submits and the payment instrument assembled from it.

use serde::{Deserialize, Serialize};

/// Expiry date of a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardExpiry {
    pub month: String,
    pub year: String,
}

/// 3-D Secure proof attached to a card payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreeDSecureToken {
    /// Processor transaction id returned by a successful authentication
    pub token: String,
}

/// Raw card details entered on the checkout page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCardInstrument {
    pub cc_number: String,
    pub cc_expiry: CardExpiry,
    pub cc_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc_cvv: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub three_d_secure: Option<ThreeDSecureToken>,
}

impl CreditCardInstrument {
    /// Number of leading digits sent for risk/routing pre-checks
    pub const BIN_LENGTH: usize = 6;

    /// Create a card instrument
    pub fn new(
        cc_number: impl Into<String>,
        month: impl Into<String>,
        year: impl Into<String>,
        cc_name: impl Into<String>,
    ) -> Self {
        Self {
            cc_number: cc_number.into(),
            cc_expiry: CardExpiry {
                month: month.into(),
                year: year.into(),
            },
            cc_name: cc_name.into(),
            cc_cvv: None,
            three_d_secure: None,
        }
    }

    /// Builder: set the security code
    pub fn with_cvv(mut self, cvv: impl Into<String>) -> Self {
        self.cc_cvv = Some(cvv.into());
        self
    }

    /// Builder: attach a 3-D Secure token
    pub fn with_three_d_secure(mut self, token: impl Into<String>) -> Self {
        self.three_d_secure = Some(ThreeDSecureToken {
            token: token.into(),
        });
        self
    }

    /// Bank identification number: the leading digits of the card number,
    /// ignoring spaces and dashes.
    pub fn bin(&self) -> String {
        self.cc_number
            .chars()
            .filter(|c| c.is_ascii_digit())
            .take(Self::BIN_LENGTH)
            .collect()
    }
}

/// Card details as reported by a wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInformation {
    #[serde(rename = "type")]
    pub card_type: String,
    pub number: String,
}

/// Tokenized payment produced by a wallet sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonceInstrument {
    pub nonce: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_information: Option<CardInformation>,
}

/// Provider-specific payment data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaymentData {
    CreditCard(CreditCardInstrument),
    Nonce(NonceInstrument),
}

impl PaymentData {
    /// Card details, if this is a card payment
    pub fn credit_card(&self) -> Option<&CreditCardInstrument> {
        match self {
            PaymentData::CreditCard(card) => Some(card),
            PaymentData::Nonce(_) => None,
        }
    }
}

/// Payment section of an order payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPaymentRequestBody {
    pub method_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_data: Option<PaymentData>,
}

/// Order payload handed to `execute()`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    #[serde(default)]
    pub use_store_credit: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<OrderPaymentRequestBody>,
}

impl OrderPayload {
    /// Create a payload paying with the given method
    pub fn with_payment(method_id: impl Into<String>, payment_data: PaymentData) -> Self {
        Self {
            use_store_credit: false,
            customer_message: None,
            payment: Some(OrderPaymentRequestBody {
                method_id: method_id.into(),
                gateway_id: None,
                payment_data: Some(payment_data),
            }),
        }
    }

    /// The body sent for order submission. Payment details never travel
    /// with the order.
    pub fn order_body(&self) -> OrderPayload {
        OrderPayload {
            use_store_credit: self.use_store_credit,
            customer_message: self.customer_message.clone(),
            payment: None,
        }
    }
}

/// Payment instrument handed to payment submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInstrument {
    pub method_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_id: Option<String>,

    pub payment_data: PaymentData,
}

impl PaymentInstrument {
    /// The 3-D Secure token carried by a card instrument, if any
    pub fn three_d_secure_token(&self) -> Option<&str> {
        self.payment_data
            .credit_card()
            .and_then(|card| card.three_d_secure.as_ref())
            .map(|t| t.token.as_str())
    }
}
