use async_trait::async_trait;

use super::types::{ChatReply, ChatRequest, InitResponse};
use crate::utils::AssistantError;

/// The remote assistant as seen by the conversation core.
///
/// Implementations collapse every failure (transport, non-success status,
/// undecodable body) into an `Err`; callers never see partial results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Acquire a session/user identity pair
    async fn init_session(&self) -> Result<InitResponse, AssistantError>;

    /// Exchange one user utterance for one assistant reply
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply, AssistantError>;
}
