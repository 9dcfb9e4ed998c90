use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::modules::transcription::model::JobError;

/// Per-user position in the submit cycle:
/// Idle → AwaitingInput (session opened) → Processing (job accepted) → Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingInput,
    Processing,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GateError {
    #[error("no open session")]
    NoSession,
    #[error("a job is already in flight for this session")]
    Busy,
}

impl From<GateError> for JobError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::NoSession => JobError::NoSession,
            GateError::Busy => JobError::SessionBusy,
        }
    }
}

/// Gate allowing at most one outstanding job per user. Each entry is only
/// ever mutated by the handler serving that user, so a plain mutexed map is
/// enough. The lock is never held across an await point.
#[derive(Clone, Debug, Default)]
pub struct SessionGate {
    inner: Arc<Mutex<HashMap<String, SessionState>>>,
}

impl SessionGate {
    pub fn state(&self, user_id: &str) -> SessionState {
        self.inner
            .lock()
            .expect("session map poisoned")
            .get(user_id)
            .copied()
            .unwrap_or(SessionState::Idle)
    }

    /// The user signals they are about to submit media. Re-opening an
    /// already-open session is fine; an in-flight job is not interrupted.
    pub fn open(&self, user_id: &str) -> Result<(), GateError> {
        let mut sessions = self.inner.lock().expect("session map poisoned");
        match sessions.get(user_id).copied().unwrap_or(SessionState::Idle) {
            SessionState::Processing => Err(GateError::Busy),
            _ => {
                sessions.insert(user_id.to_string(), SessionState::AwaitingInput);
                Ok(())
            }
        }
    }

    /// Claim the session for one job. The returned ticket returns the
    /// session to Idle when released (or dropped), and does so exactly once.
    pub fn begin(&self, user_id: &str) -> Result<SessionTicket, GateError> {
        let mut sessions = self.inner.lock().expect("session map poisoned");
        match sessions.get(user_id).copied().unwrap_or(SessionState::Idle) {
            SessionState::AwaitingInput => {
                sessions.insert(user_id.to_string(), SessionState::Processing);
                Ok(SessionTicket {
                    gate: self.clone(),
                    user_id: user_id.to_string(),
                    released: false,
                })
            }
            SessionState::Processing => Err(GateError::Busy),
            SessionState::Idle => Err(GateError::NoSession),
        }
    }

    fn finish(&self, user_id: &str) {
        self.inner
            .lock()
            .expect("session map poisoned")
            .insert(user_id.to_string(), SessionState::Idle);
    }
}

/// Holds a session in Processing for the duration of one job.
#[derive(Debug)]
pub struct SessionTicket {
    gate: SessionGate,
    user_id: String,
    released: bool,
}

impl SessionTicket {
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.gate.finish(&self.user_id);
        }
    }
}

impl Drop for SessionTicket {
    fn drop(&mut self) {
        self.release_once();
    }
}
