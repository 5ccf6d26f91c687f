use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::BookingConfirmation;
use crate::conversation::SchedulingFlow;
use crate::utils::AssistantError;

/// Top-level views; exactly one is active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewState {
    #[default]
    Conversation,
    Confirmation,
    Faq,
}

impl ViewState {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Conversation => "Chat",
            Self::Confirmation => "Confirmation",
            Self::Faq => "FAQ",
        }
    }

    /// Parse a view name typed by the user
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "chat" | "conversation" => Some(Self::Conversation),
            "confirmation" | "booking" => Some(Self::Confirmation),
            "faq" | "help" => Some(Self::Faq),
            _ => None,
        }
    }
}

/// Chooses the active view and holds the latest booking confirmation
#[derive(Debug, Default)]
pub struct ViewNavigator {
    current: ViewState,
    confirmation: Option<BookingConfirmation>,
}

impl ViewNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_view(&self) -> ViewState {
        self.current
    }

    pub fn confirmation(&self) -> Option<&BookingConfirmation> {
        self.confirmation.as_ref()
    }

    /// Switch views. The confirmation view needs a held confirmation.
    pub fn go_to(&mut self, view: ViewState) -> Result<(), AssistantError> {
        if view == ViewState::Confirmation && self.confirmation.is_none() {
            return Err(AssistantError::Navigation(
                "no booking confirmation to show".to_string(),
            ));
        }
        debug!(from = ?self.current, to = ?view, "view change");
        self.current = view;
        Ok(())
    }

    /// Enter the confirmation view with `confirmation` as the current booking.
    /// Any open slot offer is closed.
    pub fn confirm_booking(
        &mut self,
        confirmation: BookingConfirmation,
        scheduling: &mut SchedulingFlow,
    ) {
        debug!(booking_id = %confirmation.booking_id, "booking confirmed");
        scheduling.dismiss();
        self.confirmation = Some(confirmation);
        self.current = ViewState::Confirmation;
    }

    /// Back to the chat, dropping the held confirmation
    pub fn return_to_conversation(&mut self) {
        self.confirmation = None;
        self.current = ViewState::Conversation;
    }
}
