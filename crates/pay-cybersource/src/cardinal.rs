//! # Cardinal Wire Types
//!
//! Payloads exchanged with the Cardinal Cruise (Songbird) script: event
//! names, trigger names and the PascalCase bodies the script sends and
//! expects.

use serde::{Deserialize, Serialize};

/// Events the script emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardinalEventType {
    SetupCompleted,
    Validated,
}

impl CardinalEventType {
    pub const ALL: [CardinalEventType; 2] =
        [CardinalEventType::SetupCompleted, CardinalEventType::Validated];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardinalEventType::SetupCompleted => "payments.setupComplete",
            CardinalEventType::Validated => "payments.validated",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == name)
    }
}

impl std::fmt::Display for CardinalEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Triggers sent to the script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardinalTriggerEvent {
    /// Part of the Cardinal trigger set; nothing here sends it yet
    AccountNumberUpdate,
    BinProcess,
    JwtUpdate,
    OrderUpdate,
}

impl CardinalTriggerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardinalTriggerEvent::AccountNumberUpdate => "accountNumber.update",
            CardinalTriggerEvent::BinProcess => "bin.process",
            CardinalTriggerEvent::JwtUpdate => "jwt.update",
            CardinalTriggerEvent::OrderUpdate => "order.update",
        }
    }
}

impl std::fmt::Display for CardinalTriggerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Cardinal.configure` payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardinalConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentViewConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfiguration {
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentViewConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_loading: Option<bool>,
}

/// Load status of one script module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleState {
    pub loaded: bool,
    pub module: String,
}

/// `payments.setupComplete` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupCompletedData {
    pub session_id: String,

    #[serde(default)]
    pub modules: Vec<ModuleState>,
}

/// Categorical outcome of a validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionCode {
    Success,
    NoAction,
    Failure,
    Error,
    /// Any code this integration does not know about
    #[serde(other)]
    Unknown,
}

impl ActionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionCode::Success => "SUCCESS",
            ActionCode::NoAction => "NOACTION",
            ActionCode::Failure => "FAILURE",
            ActionCode::Error => "ERROR",
            ActionCode::Unknown => "UNKNOWN",
        }
    }
}

/// Payment section of a validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValidatedPayment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor_transaction_id: Option<String>,

    #[serde(default, rename = "Type", skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<String>,
}

/// `payments.validated` payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValidatedData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_code: Option<ActionCode>,

    #[serde(default)]
    pub error_number: i64,

    #[serde(default)]
    pub error_description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<ValidatedPayment>,
}

impl ValidatedData {
    pub fn new(action_code: ActionCode) -> Self {
        Self {
            action_code: Some(action_code),
            ..Self::default()
        }
    }

    /// Builder: set error number and description
    pub fn with_error(mut self, number: i64, description: impl Into<String>) -> Self {
        self.error_number = number;
        self.error_description = description.into();
        self
    }

    /// Builder: set the processor transaction id
    pub fn with_transaction_id(mut self, id: impl Into<String>) -> Self {
        self.payment = Some(ValidatedPayment {
            processor_transaction_id: Some(id.into()),
            payment_type: Some("CCA".to_string()),
        });
        self
    }

    pub fn processor_transaction_id(&self) -> Option<&str> {
        self.payment
            .as_ref()
            .and_then(|p| p.processor_transaction_id.as_deref())
    }
}

/// `bin.process` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinProcessResponse {
    #[serde(rename = "Status", default)]
    pub status: bool,
}

/// Brand passed to `Cardinal.continue`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentBrand {
    Cca,
}

impl PaymentBrand {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentBrand::Cca => "cca",
        }
    }
}

/// ACS continuation object for `Cardinal.continue`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContinueObject {
    pub acs_url: String,
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,

    /// Amount in the smallest currency unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,

    /// ISO 4217 numeric code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_channel: Option<String>,

    pub transaction_id: String,
}

/// Partial order for `Cardinal.continue` and `order.update`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PartialOrder {
    pub order_details: OrderDetails,
}
