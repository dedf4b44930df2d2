//! # Authentication Session State
//!
//! Bookkeeping shared between the orchestrator and the Cardinal event
//! listener: whether the session is live, whether setup completed, and the
//! single execute call currently waiting for `payments.validated`.
//!
//! ```text
//!   execute ──register()──▶ pending slot ◀──handle(Validated)── listener
//!      │                         │
//!      └────── wait(timeout) ◀───┘ oneshot
//! ```

use crate::cardinal::{ActionCode, ValidatedData};
use crate::session::CardinalEvent;
use chrono::{DateTime, Utc};
use pay_core::{PaymentError, PaymentResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Record of one authentication attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationSession {
    /// Attempt id, also used to tag the pending validation
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Cardinal session id from `payments.setupComplete`
    pub session_id: Option<String>,
    pub action_code: Option<ActionCode>,
    pub error_number: i64,
    pub error_description: String,
    /// Set only for a successful authentication
    pub processor_transaction_id: Option<String>,
}

impl AuthenticationSession {
    pub fn begin(session_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            session_id,
            action_code: None,
            error_number: 0,
            error_description: String::new(),
            processor_transaction_id: None,
        }
    }

    /// Copy the validation outcome into the record
    pub fn record(&mut self, data: &ValidatedData) {
        self.action_code = data.action_code;
        self.error_number = data.error_number;
        self.error_description = data.error_description.clone();
        self.processor_transaction_id = match data.action_code {
            Some(ActionCode::Success) => data.processor_transaction_id().map(str::to_string),
            _ => None,
        };
    }

    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }
}

type PendingSlot = Option<(Uuid, oneshot::Sender<ValidatedData>)>;

/// State the Cardinal listener writes and the orchestrator reads
#[derive(Debug, Default)]
pub struct SessionState {
    active: AtomicBool,
    setup_complete: AtomicBool,
    session_id: Mutex<Option<String>>,
    pending: Mutex<PendingSlot>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start accepting events
    pub fn activate(&self) {
        self.setup_complete.store(false, Ordering::SeqCst);
        *self.session_id.lock() = None;
        self.active.store(true, Ordering::SeqCst);
    }

    /// Stop accepting events and release any waiter
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.setup_complete.store(false, Ordering::SeqCst);
        // Dropping the sender wakes the waiter with a closed channel
        self.pending.lock().take();
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn is_setup_complete(&self) -> bool {
        self.setup_complete.load(Ordering::SeqCst)
    }

    pub fn session_id(&self) -> Option<String> {
        self.session_id.lock().clone()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    /// Route an event from the script
    pub fn handle(&self, event: CardinalEvent) {
        if !self.is_active() {
            debug!(event = %event.event_type(), "Ignoring Cardinal event on inactive session");
            return;
        }

        match event {
            CardinalEvent::SetupCompleted(data) => {
                info!(session_id = %data.session_id, "Cardinal setup completed");
                *self.session_id.lock() = Some(data.session_id);
                self.setup_complete.store(true, Ordering::SeqCst);
            }
            CardinalEvent::Validated { data, .. } => match self.pending.lock().take() {
                Some((attempt, sender)) => {
                    debug!(%attempt, "Delivering validation outcome");
                    if sender.send(data).is_err() {
                        debug!(%attempt, "Validation waiter already gone");
                    }
                }
                None => warn!("Validation outcome with no pending authentication"),
            },
        }
    }

    /// Park a waiter for the next validation outcome. Replaces (and thereby
    /// closes) any earlier waiter.
    pub fn register(state: &Arc<SessionState>, attempt: Uuid) -> PendingValidation {
        let (sender, receiver) = oneshot::channel();

        if let Some((previous, _)) = state.pending.lock().replace((attempt, sender)) {
            warn!(%previous, %attempt, "Superseding pending authentication");
        }

        PendingValidation {
            attempt,
            receiver: Some(receiver),
            state: Arc::clone(state),
        }
    }
}

/// A parked wait for `payments.validated`.
///
/// Dropping it (including dropping the future that owns it) frees the
/// pending slot if it still belongs to this attempt.
#[derive(Debug)]
pub struct PendingValidation {
    attempt: Uuid,
    receiver: Option<oneshot::Receiver<ValidatedData>>,
    state: Arc<SessionState>,
}

impl PendingValidation {
    pub fn attempt(&self) -> Uuid {
        self.attempt
    }

    /// Wait for the outcome, bounded by `timeout` when given
    pub async fn wait(mut self, timeout: Option<Duration>) -> PaymentResult<ValidatedData> {
        let receiver = self
            .receiver
            .take()
            .ok_or_else(|| PaymentError::Internal("validation already awaited".to_string()))?;

        let received = match timeout {
            Some(limit) => tokio::time::timeout(limit, receiver).await.map_err(|_| {
                warn!(attempt = %self.attempt, secs = limit.as_secs(), "Authentication timed out");
                PaymentError::AuthenticationTimedOut {
                    after_secs: limit.as_secs(),
                }
            })?,
            None => receiver.await,
        };

        received.map_err(|_| {
            PaymentError::NotInitialized(
                "Cardinal session closed before authentication completed".to_string(),
            )
        })
    }
}

impl Drop for PendingValidation {
    fn drop(&mut self) {
        let mut pending = self.state.pending.lock();
        if matches!(pending.as_ref(), Some((attempt, _)) if *attempt == self.attempt) {
            pending.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cardinal::SetupCompletedData;

    fn validated(code: ActionCode) -> CardinalEvent {
        CardinalEvent::Validated {
            data: ValidatedData::new(code),
            jwt: None,
        }
    }

    fn active_state() -> Arc<SessionState> {
        let state = Arc::new(SessionState::new());
        state.activate();
        state
    }

    #[test]
    fn test_record_keeps_transaction_id_only_on_success() {
        let mut auth = AuthenticationSession::begin(Some("s-1".into()));
        auth.record(&ValidatedData::new(ActionCode::Success).with_transaction_id("TXN1"));
        assert_eq!(auth.processor_transaction_id.as_deref(), Some("TXN1"));

        let mut auth = AuthenticationSession::begin(None);
        auth.record(
            &ValidatedData::new(ActionCode::Failure)
                .with_error(0, "declined")
                .with_transaction_id("TXN2"),
        );
        assert!(auth.processor_transaction_id.is_none());
        assert_eq!(auth.error_description, "declined");
    }

    #[test]
    fn test_setup_completed_records_session() {
        let state = active_state();
        state.handle(CardinalEvent::SetupCompleted(SetupCompletedData {
            session_id: "abc".into(),
            modules: vec![],
        }));

        assert!(state.is_setup_complete());
        assert_eq!(state.session_id().as_deref(), Some("abc"));
    }

    #[test]
    fn test_inactive_state_ignores_events() {
        let state = Arc::new(SessionState::new());
        let _pending = SessionState::register(&state, Uuid::new_v4());

        state.handle(validated(ActionCode::Success));

        assert!(state.has_pending());
    }

    #[tokio::test]
    async fn test_validated_resolves_waiter() {
        let state = active_state();
        let pending = SessionState::register(&state, Uuid::new_v4());

        state.handle(validated(ActionCode::NoAction));

        let data = pending.wait(None).await.unwrap();
        assert_eq!(data.action_code, Some(ActionCode::NoAction));
        assert!(!state.has_pending());
    }

    #[tokio::test]
    async fn test_validated_without_waiter_is_dropped() {
        let state = active_state();
        state.handle(validated(ActionCode::Success));

        let pending = SessionState::register(&state, Uuid::new_v4());
        assert!(state.has_pending());
        drop(pending);
        assert!(!state.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out() {
        let state = active_state();
        let pending = SessionState::register(&state, Uuid::new_v4());

        let err = pending.wait(Some(Duration::from_secs(30))).await.unwrap_err();

        assert_eq!(err, PaymentError::AuthenticationTimedOut { after_secs: 30 });
        assert!(!state.has_pending());
    }

    #[tokio::test]
    async fn test_deactivate_closes_waiter() {
        let state = active_state();
        let pending = SessionState::register(&state, Uuid::new_v4());

        state.deactivate();

        let err = pending.wait(None).await.unwrap_err();
        assert!(matches!(err, PaymentError::NotInitialized(_)));
    }

    #[tokio::test]
    async fn test_stale_guard_keeps_newer_waiter() {
        let state = active_state();
        let first = SessionState::register(&state, Uuid::new_v4());
        let second = SessionState::register(&state, Uuid::new_v4());

        drop(first);
        assert!(state.has_pending());

        state.handle(validated(ActionCode::Success));
        assert!(second.wait(None).await.is_ok());
    }
}
