use thiserror::Error;

/// Main error type for the appointment assistant
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend returned status {0}")]
    Status(u16),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("No session available")]
    SessionUnavailable,

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssistantError {
    /// Whether this error came from talking to the backend
    pub fn is_exchange_failure(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Status(_) | Self::Decode(_) | Self::MalformedPayload(_)
        )
    }
}

impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AssistantError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
