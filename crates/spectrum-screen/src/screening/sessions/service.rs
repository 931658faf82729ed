use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::views::SessionView;
use crate::screening::controller::{
    ControllerError, CorrelationToken, SubmissionController, SubmissionOutcome,
};
use crate::screening::intake::{Questionnaire, WizardError};
use crate::screening::scoring::ScoringClient;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("session-{id:06}"))
}

#[derive(Debug, thiserror::Error)]
pub enum SessionServiceError {
    #[error("intake session '{0}' does not exist")]
    UnknownSession(String),
    #[error(transparent)]
    Controller(#[from] ControllerError),
}

impl From<WizardError> for SessionServiceError {
    fn from(err: WizardError) -> Self {
        Self::Controller(err.into())
    }
}

/// What a submit request did, together with the session afterwards.
#[derive(Debug, Clone)]
pub struct SubmitReport {
    pub outcome: SubmissionOutcome,
    pub session: SessionView,
}

struct SessionEntry {
    controller: SubmissionController,
    created_at: DateTime<Utc>,
}

type SessionMap = HashMap<SessionId, SessionEntry>;

/// Fails the session's pending submission if the exchange is dropped before it completes.
struct InFlightGuard<'a> {
    sessions: &'a Mutex<SessionMap>,
    id: &'a SessionId,
    token: Option<CorrelationToken>,
}

impl InFlightGuard<'_> {
    fn disarm(&mut self) {
        self.token = None;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let Some(token) = self.token.take() else {
            return;
        };
        let Ok(mut sessions) = self.sessions.lock() else {
            return;
        };
        if let Some(entry) = sessions.get_mut(self.id) {
            let outcome = entry.controller.abandon_submit(token);
            warn!(session = %self.id.0, outcome = ?outcome, "intake submission abandoned");
        }
    }
}

/// In-memory registry of intake sessions backed by one scoring client.
pub struct IntakeSessionService<C> {
    questionnaire: Arc<Questionnaire>,
    client: Arc<C>,
    sessions: Mutex<SessionMap>,
}

impl<C> IntakeSessionService<C>
where
    C: ScoringClient + 'static,
{
    pub fn new(questionnaire: Arc<Questionnaire>, client: Arc<C>) -> Self {
        Self {
            questionnaire,
            client,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn questionnaire(&self) -> &Arc<Questionnaire> {
        &self.questionnaire
    }

    pub fn create(&self) -> SessionView {
        let id = next_session_id();
        let entry = SessionEntry {
            controller: SubmissionController::new(self.questionnaire.clone()),
            created_at: Utc::now(),
        };
        let view = SessionView::capture(&id, entry.created_at, &entry.controller);
        self.lock().insert(id.clone(), entry);
        info!(session = %id.0, "intake session created");
        view
    }

    pub fn view(&self, id: &SessionId) -> Result<SessionView, SessionServiceError> {
        self.with_session(id, |_| Ok(()))
    }

    pub fn set_field(
        &self,
        id: &SessionId,
        key: &str,
        value: Option<String>,
    ) -> Result<SessionView, SessionServiceError> {
        self.with_session(id, |controller| {
            match value {
                Some(raw) => controller.set_field_value(key, raw)?,
                None => controller.clear_field_value(key)?,
            }
            Ok(())
        })
    }

    pub fn advance(&self, id: &SessionId) -> Result<SessionView, SessionServiceError> {
        self.with_session(id, |controller| {
            controller.advance()?;
            Ok(())
        })
    }

    pub fn retreat(&self, id: &SessionId) -> Result<SessionView, SessionServiceError> {
        self.with_session(id, |controller| {
            controller.retreat()?;
            Ok(())
        })
    }

    pub fn reset(&self, id: &SessionId) -> Result<SessionView, SessionServiceError> {
        self.with_session(id, |controller| {
            controller.on_reset();
            Ok(())
        })
    }

    /// Drop the session and everything it holds.
    pub fn close(&self, id: &SessionId) -> Result<(), SessionServiceError> {
        self.lock()
            .remove(id)
            .ok_or_else(|| SessionServiceError::UnknownSession(id.0.clone()))?;
        info!(session = %id.0, "intake session closed");
        Ok(())
    }

    /// Submit the session's answers. The registry lock is released while the scoring
    /// request is in flight. If this future is dropped before the response arrives, the
    /// submission is failed so the session returns to editing.
    pub async fn submit(&self, id: &SessionId) -> Result<SubmitReport, SessionServiceError> {
        let pending = {
            let mut sessions = self.lock();
            let entry = sessions
                .get_mut(id)
                .ok_or_else(|| SessionServiceError::UnknownSession(id.0.clone()))?;
            entry.controller.begin_submit()?
        };
        let mut guard = InFlightGuard {
            sessions: &self.sessions,
            id,
            token: Some(pending.token),
        };

        let outcome = self.client.score(&pending.payload).await;
        guard.disarm();

        let mut sessions = self.lock();
        let entry = sessions
            .get_mut(id)
            .ok_or_else(|| SessionServiceError::UnknownSession(id.0.clone()))?;
        let outcome = entry.controller.complete_submit(pending.token, outcome);
        info!(session = %id.0, outcome = ?outcome, "intake submission finished");
        Ok(SubmitReport {
            outcome,
            session: SessionView::capture(id, entry.created_at, &entry.controller),
        })
    }

    pub fn session_count(&self) -> usize {
        self.lock().len()
    }

    fn with_session<F>(&self, id: &SessionId, action: F) -> Result<SessionView, SessionServiceError>
    where
        F: FnOnce(&mut SubmissionController) -> Result<(), SessionServiceError>,
    {
        let mut sessions = self.lock();
        let entry = sessions
            .get_mut(id)
            .ok_or_else(|| SessionServiceError::UnknownSession(id.0.clone()))?;
        action(&mut entry.controller)?;
        Ok(SessionView::capture(id, entry.created_at, &entry.controller))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionMap> {
        self.sessions.lock().expect("session registry mutex poisoned")
    }
}
