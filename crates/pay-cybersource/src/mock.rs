//! Scriptable Cardinal session and script host for tests.

use crate::cardinal::{
    BinProcessResponse, CardinalConfiguration, CardinalEventType, CardinalTriggerEvent,
    ContinueObject, PartialOrder, PaymentBrand, SetupCompletedData, ValidatedData,
};
use crate::script::CardinalScriptHost;
use crate::session::{CardinalEvent, CardinalSession, EventListener, EventTable, SessionHandle};
use async_trait::async_trait;
use pay_core::{PaymentError, PaymentResult};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cardinal session that records every call and emits scripted events
#[derive(Debug, Default)]
pub struct MockCardinalSession {
    pub events: EventTable,
    configurations: Mutex<Vec<CardinalConfiguration>>,
    setups: Mutex<Vec<String>>,
    subscriptions: Mutex<Vec<CardinalEventType>>,
    triggers: Mutex<Vec<(CardinalTriggerEvent, Option<serde_json::Value>)>>,
    continues: Mutex<Vec<(ContinueObject, PartialOrder)>>,
    setup_completed: Mutex<Option<SetupCompletedData>>,
    validate_on_bin: Mutex<Option<ValidatedData>>,
    validate_on_continue: Mutex<Option<ValidatedData>>,
    trigger_error: Mutex<Option<(CardinalTriggerEvent, PaymentError)>>,
}

impl MockCardinalSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `payments.setupComplete` with a session id when `setup` runs
    pub fn complete_setup(&self, session_id: &str) {
        *self.setup_completed.lock() = Some(SetupCompletedData {
            session_id: session_id.to_string(),
            modules: vec![],
        });
    }

    /// Leave `setup` without a completion event
    pub fn skip_setup_completion(&self) {
        *self.setup_completed.lock() = None;
    }

    /// Emit `payments.validated` when `bin.process` is triggered
    pub fn validate_on_bin(&self, data: ValidatedData) {
        *self.validate_on_bin.lock() = Some(data);
    }

    /// Emit `payments.validated` when the challenge is continued
    pub fn validate_on_continue(&self, data: ValidatedData) {
        *self.validate_on_continue.lock() = Some(data);
    }

    /// Fail every trigger of `event` with `error`
    pub fn fail_trigger(&self, event: CardinalTriggerEvent, error: PaymentError) {
        *self.trigger_error.lock() = Some((event, error));
    }

    pub fn configurations(&self) -> Vec<CardinalConfiguration> {
        self.configurations.lock().clone()
    }

    pub fn setups(&self) -> Vec<String> {
        self.setups.lock().clone()
    }

    pub fn subscriptions(&self) -> Vec<CardinalEventType> {
        self.subscriptions.lock().clone()
    }

    pub fn triggers(&self) -> Vec<(CardinalTriggerEvent, Option<serde_json::Value>)> {
        self.triggers.lock().clone()
    }

    pub fn trigger_names(&self) -> Vec<&'static str> {
        self.triggers.lock().iter().map(|(e, _)| e.as_str()).collect()
    }

    pub fn continues(&self) -> Vec<(ContinueObject, PartialOrder)> {
        self.continues.lock().clone()
    }

    fn emit_validated(&self, data: Option<ValidatedData>) {
        if let Some(data) = data {
            self.events.emit(CardinalEvent::Validated {
                data,
                jwt: Some("response-jwt".to_string()),
            });
        }
    }
}

#[async_trait]
impl CardinalSession for MockCardinalSession {
    fn configure(&self, configuration: &CardinalConfiguration) -> PaymentResult<()> {
        self.configurations.lock().push(configuration.clone());
        Ok(())
    }

    fn on(&self, event: CardinalEventType, listener: EventListener) {
        self.subscriptions.lock().push(event);
        self.events.on(event, listener);
    }

    fn off(&self, event: CardinalEventType) {
        self.events.off(event);
    }

    fn setup(&self, jwt: &str) -> PaymentResult<()> {
        self.setups.lock().push(jwt.to_string());

        let completed = self.setup_completed.lock().clone();
        if let Some(data) = completed {
            self.events.emit(CardinalEvent::SetupCompleted(data));
        }
        Ok(())
    }

    async fn trigger(
        &self,
        event: CardinalTriggerEvent,
        data: Option<serde_json::Value>,
    ) -> PaymentResult<Option<BinProcessResponse>> {
        self.triggers.lock().push((event, data));

        let failure = self.trigger_error.lock().clone();
        if let Some((failing, error)) = failure {
            if failing == event {
                return Err(error);
            }
        }

        match event {
            CardinalTriggerEvent::BinProcess => {
                let validated = self.validate_on_bin.lock().clone();
                self.emit_validated(validated);
                Ok(Some(BinProcessResponse { status: true }))
            }
            _ => Ok(None),
        }
    }

    fn continue_challenge(
        &self,
        _brand: PaymentBrand,
        continue_object: &ContinueObject,
        order: &PartialOrder,
    ) -> PaymentResult<()> {
        self.continues
            .lock()
            .push((continue_object.clone(), order.clone()));

        let validated = self.validate_on_continue.lock().clone();
        self.emit_validated(validated);
        Ok(())
    }
}

/// Script host that "loads" by recording the URL
#[derive(Debug, Default)]
pub struct MockScriptHost {
    session: Option<Arc<MockCardinalSession>>,
    loads: Mutex<Vec<String>>,
}

impl MockScriptHost {
    pub fn new(session: Arc<MockCardinalSession>) -> Self {
        Self {
            session: Some(session),
            loads: Mutex::new(Vec::new()),
        }
    }

    /// Host whose script never installs a session
    pub fn without_session() -> Self {
        Self::default()
    }

    pub fn loaded_urls(&self) -> Vec<String> {
        self.loads.lock().clone()
    }
}

#[async_trait]
impl CardinalScriptHost for MockScriptHost {
    async fn load_script(&self, url: &str) -> PaymentResult<()> {
        self.loads.lock().push(url.to_string());
        Ok(())
    }

    fn cardinal(&self) -> Option<SessionHandle> {
        self.session
            .clone()
            .map(|session| session as SessionHandle)
    }
}
