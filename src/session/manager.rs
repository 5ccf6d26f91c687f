use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::backend::ChatBackend;
use crate::utils::AssistantError;

/// Backend-issued identity pair scoping all chat traffic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
}

/// Lifecycle of the one session this process will ever hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Startup, before the init call has completed
    Initializing,
    Ready(Session),
    /// Init failed; the conversation stays disabled until restart
    Failed(String),
}

/// Acquires the session once and remembers the outcome
#[derive(Debug)]
pub struct SessionManager {
    status: SessionStatus,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Initializing,
        }
    }

    /// Call the session-init collaborator.
    ///
    /// Only the first call reaches the backend. Later calls replay the first
    /// outcome; retrying requires a fresh `SessionManager`.
    pub async fn initialize(
        &mut self,
        backend: &dyn ChatBackend,
    ) -> Result<&Session, AssistantError> {
        if matches!(self.status, SessionStatus::Initializing) {
            self.status = match backend.init_session().await {
                Ok(init) => {
                    debug!(session_id = %init.session_id, "session established");
                    SessionStatus::Ready(Session {
                        session_id: init.session_id,
                        user_id: init.user_id,
                    })
                }
                Err(e) => {
                    error!("session initialization failed: {}", e);
                    SessionStatus::Failed(e.to_string())
                }
            };
        }

        match &self.status {
            SessionStatus::Ready(session) => Ok(session),
            _ => Err(AssistantError::SessionUnavailable),
        }
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.status {
            SessionStatus::Ready(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_initializing(&self) -> bool {
        matches!(self.status, SessionStatus::Initializing)
    }
}
