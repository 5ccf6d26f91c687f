use tracing::{debug, warn};

use super::message::{IdGenerator, Message};
use super::store::ConversationStore;
use crate::backend::{ChatReply, ChatRequest, SideChannels};
use crate::session::Session;
use crate::utils::AssistantError;

/// Shortcut buttons that expand to a canned utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    Schedule,
    CheckAvailability,
    Faq,
    Cancel,
}

impl QuickAction {
    pub const ALL: [QuickAction; 4] = [
        QuickAction::Schedule,
        QuickAction::CheckAvailability,
        QuickAction::Faq,
        QuickAction::Cancel,
    ];

    /// Parse an action token (for front ends and config)
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "schedule" => Some(Self::Schedule),
            "check_availability" => Some(Self::CheckAvailability),
            "faq" => Some(Self::Faq),
            "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::Schedule => "schedule",
            Self::CheckAvailability => "check_availability",
            Self::Faq => "faq",
            Self::Cancel => "cancel",
        }
    }

    pub fn utterance(&self) -> &'static str {
        match self {
            Self::Schedule => "I would like to schedule an appointment",
            Self::CheckAvailability => "What appointment slots are available?",
            Self::Faq => "Tell me about your clinic services",
            Self::Cancel => "I need to cancel an appointment",
        }
    }
}

/// Map a quick-action token to its utterance; unknown tokens pass through
pub fn quick_action_utterance(token: &str) -> String {
    QuickAction::from_token(token)
        .map(|action| action.utterance().to_string())
        .unwrap_or_else(|| token.to_string())
}

/// What a completed exchange produced
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeOutcome {
    /// The reply was appended; side channels still need routing
    Replied(SideChannels),
    /// The inline error message was appended
    Failed,
}

/// Drives the send/receive cycle against the conversation log
#[derive(Debug, Default)]
pub struct MessageExchange {
    input: String,
    awaiting_reply: bool,
    ids: IdGenerator,
}

impl MessageExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// True between dispatch and completion; drives the typing indicator
    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    /// Whether the send affordance should be enabled for `text`
    pub fn can_send(&self, session: Option<&Session>, text: &str) -> bool {
        session.is_some() && !self.awaiting_reply && !text.trim().is_empty()
    }

    /// Optimistically record the user's utterance and build the request.
    ///
    /// Returns `None` without touching any state when the text is blank, no
    /// session exists, or a reply is still pending.
    pub fn begin(
        &mut self,
        store: &mut ConversationStore,
        session: Option<&Session>,
        text: &str,
    ) -> Option<ChatRequest> {
        if text.trim().is_empty() {
            return None;
        }
        let Some(session) = session else {
            debug!("send ignored: no session");
            return None;
        };
        if self.awaiting_reply {
            warn!("send rejected: a reply is still pending");
            return None;
        }

        store.append(Message::user(self.ids.next("user"), text));
        self.input.clear();
        self.awaiting_reply = true;

        Some(ChatRequest {
            message: text.to_string(),
            session_id: session.session_id.clone(),
            user_id: session.user_id.clone(),
        })
    }

    /// Record the outcome of the collaborator call.
    ///
    /// Exactly one assistant message is appended either way, and the pending
    /// state is always cleared.
    pub fn complete(
        &mut self,
        store: &mut ConversationStore,
        result: Result<ChatReply, AssistantError>,
    ) -> ExchangeOutcome {
        self.awaiting_reply = false;

        match result {
            Ok(reply) => {
                store.append(Message::from_reply(self.ids.next("agent"), &reply));
                ExchangeOutcome::Replied(reply.side_channels())
            }
            Err(e) => {
                warn!("exchange failed: {}", e);
                store.append(Message::exchange_error(self.ids.next("error")));
                ExchangeOutcome::Failed
            }
        }
    }
}
