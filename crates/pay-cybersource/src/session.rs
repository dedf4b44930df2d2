//! # Cardinal Session Handle
//!
//! The live session object exposed by the Cardinal script, behind a trait so
//! the orchestrator owns an injected handle instead of reading a global.
//!
//! Incoming events are routed through an `EventTable`: a typed dispatch
//! table keyed by event type with one subscriber per event.

use crate::cardinal::{
    BinProcessResponse, CardinalConfiguration, CardinalEventType, CardinalTriggerEvent,
    ContinueObject, PartialOrder, PaymentBrand, SetupCompletedData, ValidatedData,
};
use async_trait::async_trait;
use pay_core::{PaymentError, PaymentResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Typed event emitted by the script
#[derive(Debug, Clone, PartialEq)]
pub enum CardinalEvent {
    SetupCompleted(SetupCompletedData),
    Validated {
        data: ValidatedData,
        /// Signed response token; opaque here
        jwt: Option<String>,
    },
}

impl CardinalEvent {
    pub fn event_type(&self) -> CardinalEventType {
        match self {
            CardinalEvent::SetupCompleted(_) => CardinalEventType::SetupCompleted,
            CardinalEvent::Validated { .. } => CardinalEventType::Validated,
        }
    }

    /// Build a typed event from a raw event name and JSON payload
    pub fn from_raw(
        name: &str,
        payload: serde_json::Value,
        jwt: Option<String>,
    ) -> PaymentResult<Self> {
        let event_type = CardinalEventType::from_name(name).ok_or_else(|| {
            PaymentError::InvalidArgument(format!("unknown Cardinal event: {}", name))
        })?;

        Ok(match event_type {
            CardinalEventType::SetupCompleted => {
                CardinalEvent::SetupCompleted(serde_json::from_value(payload)?)
            }
            CardinalEventType::Validated => CardinalEvent::Validated {
                data: serde_json::from_value(payload)?,
                jwt,
            },
        })
    }
}

/// Callback registered for an event
pub type EventListener = Arc<dyn Fn(CardinalEvent) + Send + Sync>;

/// Dispatch table from event type to its single subscriber
#[derive(Default)]
pub struct EventTable {
    listeners: RwLock<HashMap<CardinalEventType, EventListener>>,
}

impl EventTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener`. Returns true when it replaced a previous one.
    pub fn on(&self, event: CardinalEventType, listener: EventListener) -> bool {
        self.listeners.write().insert(event, listener).is_some()
    }

    /// Unsubscribe. Returns true when a listener was removed.
    pub fn off(&self, event: CardinalEventType) -> bool {
        self.listeners.write().remove(&event).is_some()
    }

    pub fn is_subscribed(&self, event: CardinalEventType) -> bool {
        self.listeners.read().contains_key(&event)
    }

    /// Current subscriber for `event`
    pub fn listener(&self, event: CardinalEventType) -> Option<EventListener> {
        self.listeners.read().get(&event).cloned()
    }

    /// Deliver `event` to its subscriber. Returns false when nobody listens.
    pub fn emit(&self, event: CardinalEvent) -> bool {
        let event_type = event.event_type();
        // Cloned out so a listener may re-enter the table
        let listener = self.listener(event_type);

        match listener {
            Some(listener) => {
                trace!(event = %event_type, "Dispatching Cardinal event");
                listener(event);
                true
            }
            None => {
                debug!(event = %event_type, "No subscriber for Cardinal event");
                false
            }
        }
    }

    /// Parse and deliver a raw event coming from the script bridge
    pub fn emit_raw(
        &self,
        name: &str,
        payload: serde_json::Value,
        jwt: Option<String>,
    ) -> PaymentResult<bool> {
        Ok(self.emit(CardinalEvent::from_raw(name, payload, jwt)?))
    }
}

impl std::fmt::Debug for EventTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let events: Vec<&'static str> = self.listeners.read().keys().map(|e| e.as_str()).collect();
        f.debug_struct("EventTable").field("subscribed", &events).finish()
    }
}

/// Live Cardinal session
#[async_trait]
pub trait CardinalSession: Send + Sync {
    /// `Cardinal.configure`
    fn configure(&self, configuration: &CardinalConfiguration) -> PaymentResult<()>;

    /// `Cardinal.on`: subscribe, replacing any previous subscriber
    fn on(&self, event: CardinalEventType, listener: EventListener);

    /// `Cardinal.off`
    fn off(&self, event: CardinalEventType);

    /// `Cardinal.setup("init", { jwt })`
    fn setup(&self, jwt: &str) -> PaymentResult<()>;

    /// `Cardinal.trigger`. Only `bin.process` resolves with a response.
    async fn trigger(
        &self,
        event: CardinalTriggerEvent,
        data: Option<serde_json::Value>,
    ) -> PaymentResult<Option<BinProcessResponse>>;

    /// `Cardinal.continue`: hand the shopper to the issuer challenge
    fn continue_challenge(
        &self,
        brand: PaymentBrand,
        continue_object: &ContinueObject,
        order: &PartialOrder,
    ) -> PaymentResult<()>;
}

/// Type alias for a shared session handle
pub type SessionHandle = Arc<dyn CardinalSession>;
