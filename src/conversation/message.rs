use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::backend::{ChatReply, SuggestedSlot};
use crate::constants::{EXCHANGE_ERROR_MESSAGE, WELCOME_MESSAGE, WELCOME_MESSAGE_ID};

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageOrigin {
    User,
    Assistant,
}

/// Stable identifier for list rendering
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mints ids of the form `msg_<millis>_<seq>_<suffix>`.
///
/// The sequence number keeps ids unique when several are minted within the
/// same millisecond.
#[derive(Debug, Default)]
pub struct IdGenerator {
    sequence: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, suffix: &str) -> MessageId {
        self.sequence += 1;
        MessageId(format!(
            "msg_{}_{}_{}",
            Local::now().timestamp_millis(),
            self.sequence,
            suffix
        ))
    }
}

/// One entry in the conversation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub origin: MessageOrigin,
    pub text: String,
    pub timestamp: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_action: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_slots: Option<Vec<SuggestedSlot>>,
    #[serde(default)]
    pub is_error: bool,
}

impl Message {
    fn plain(id: MessageId, origin: MessageOrigin, text: String) -> Self {
        Self {
            id,
            origin,
            text,
            timestamp: Local::now(),
            requires_action: None,
            action_type: None,
            suggested_slots: None,
            is_error: false,
        }
    }

    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self::plain(id, MessageOrigin::User, text.into())
    }

    /// The onboarding message shown once a session exists
    pub fn welcome() -> Self {
        Self::plain(
            MessageId(WELCOME_MESSAGE_ID.to_string()),
            MessageOrigin::Assistant,
            WELCOME_MESSAGE.to_string(),
        )
    }

    /// Assistant message carrying the reply's fields through verbatim
    pub fn from_reply(id: MessageId, reply: &ChatReply) -> Self {
        Self {
            requires_action: reply.requires_action,
            action_type: reply.action_type.clone(),
            suggested_slots: reply.suggested_slots.clone(),
            ..Self::plain(id, MessageOrigin::Assistant, reply.response.clone())
        }
    }

    /// Inline error shown in place of a failed reply
    pub fn exchange_error(id: MessageId) -> Self {
        Self {
            is_error: true,
            ..Self::plain(id, MessageOrigin::Assistant, EXCHANGE_ERROR_MESSAGE.to_string())
        }
    }

    pub fn is_welcome(&self) -> bool {
        self.id.as_str() == WELCOME_MESSAGE_ID
    }

    pub fn is_user(&self) -> bool {
        self.origin == MessageOrigin::User
    }
}
