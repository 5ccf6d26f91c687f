use tokio::sync::broadcast;

use crate::backend::{BookingConfirmation, SuggestedSlot};
use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::conversation::Message;
use crate::navigation::ViewState;

/// Severity of a transient notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// State changes published to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    SessionReady {
        session_id: String,
        user_id: String,
    },
    Notification {
        level: NotificationLevel,
        text: String,
    },
    MessageAppended(Message),
    InputChanged(String),
    /// Typing indicator on/off
    AwaitingReply(bool),
    SlotsOffered(Vec<SuggestedSlot>),
    SlotsCleared,
    ViewChanged(ViewState),
    BookingConfirmed(BookingConfirmation),
}

/// Fan-out of [`AppEvent`]s to any number of subscribers
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    /// Publish an event; having no subscribers is fine
    pub fn emit(&self, event: AppEvent) {
        let _ = self.tx.send(event);
    }
}
