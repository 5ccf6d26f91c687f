use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::events::{AppEvent, EventBus, NotificationLevel};
use crate::backend::{BookingConfirmation, ChatBackend, ChatReply, ChatRequest, SuggestedSlot};
use crate::constants::{BOOKING_SUCCESS_NOTICE, INIT_FAILURE_NOTICE};
use crate::conversation::{
    quick_action_utterance, ConversationStore, ExchangeOutcome, Message, MessageExchange,
    SchedulingFlow,
};
use crate::navigation::{ViewNavigator, ViewState};
use crate::session::{Session, SessionManager, SessionStatus};
use crate::utils::AssistantError;

/// Root of the client: hosts the conversation subsystem and the view
/// navigator, and publishes every state change on the event bus.
///
/// All mutation goes through `&mut self`, so transitions run to completion
/// one at a time.
pub struct AppState {
    backend: Arc<dyn ChatBackend>,
    session: SessionManager,
    store: ConversationStore,
    exchange: MessageExchange,
    scheduling: SchedulingFlow,
    navigator: ViewNavigator,
    events: EventBus,
}

impl AppState {
    /// Create new app state around a backend
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            session: SessionManager::new(),
            store: ConversationStore::new(),
            exchange: MessageExchange::new(),
            scheduling: SchedulingFlow::new(),
            navigator: ViewNavigator::new(),
            events: EventBus::new(),
        }
    }

    /// Observe state changes
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.events.subscribe()
    }

    /// Establish the session and seed the welcome message.
    ///
    /// On failure a notification is published and the conversation stays
    /// disabled; the error is also returned so the host can log it. Later
    /// calls replay the outcome without publishing anything.
    pub async fn initialize(&mut self) -> Result<(), AssistantError> {
        let first_attempt = self.session.is_initializing();
        let backend = Arc::clone(&self.backend);
        match self.session.initialize(backend.as_ref()).await {
            Ok(_) if !first_attempt => Ok(()),
            Ok(session) => {
                let session = session.clone();
                info!(session_id = %session.session_id, "chat session ready");
                self.events.emit(AppEvent::SessionReady {
                    session_id: session.session_id,
                    user_id: session.user_id,
                });
                if let Some(welcome) = self.store.seed_welcome() {
                    self.events.emit(AppEvent::MessageAppended(welcome.clone()));
                }
                Ok(())
            }
            Err(e) if !first_attempt => Err(e),
            Err(e) => {
                self.events.emit(AppEvent::Notification {
                    level: NotificationLevel::Error,
                    text: INIT_FAILURE_NOTICE.to_string(),
                });
                Err(e)
            }
        }
    }

    // -- input buffer --------------------------------------------------------

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.exchange.set_input(text);
        self.events
            .emit(AppEvent::InputChanged(self.exchange.input().to_string()));
    }

    pub fn input(&self) -> &str {
        self.exchange.input()
    }

    /// Whether the send affordance is enabled for the current input
    pub fn can_send(&self) -> bool {
        self.exchange
            .can_send(self.session.session(), self.exchange.input())
    }

    /// Send whatever is in the input buffer
    pub async fn submit_input(&mut self) -> bool {
        let request = self.begin_submit();
        self.dispatch(request).await
    }

    /// [`AppState::begin_send`] for the input buffer
    pub fn begin_submit(&mut self) -> Option<ChatRequest> {
        let text = self.exchange.input().to_string();
        self.begin_send(&text)
    }

    // -- exchange ------------------------------------------------------------

    /// Send one utterance and process the reply.
    ///
    /// Returns `false` if the send was a no-op (blank text, no session, or a
    /// reply already pending). Exchange failures are not errors here: they
    /// end up as an inline error message.
    pub async fn send(&mut self, text: &str) -> bool {
        let request = self.begin_send(text);
        self.dispatch(request).await
    }

    async fn dispatch(&mut self, request: Option<ChatRequest>) -> bool {
        let Some(request) = request else {
            return false;
        };
        let result = self.backend.send_message(&request).await;
        self.finish_send(result);
        true
    }

    /// First half of [`AppState::send`] for hosts that drive the backend
    /// call themselves: records the user message and enters the pending
    /// state.
    pub fn begin_send(&mut self, text: &str) -> Option<ChatRequest> {
        let request = self
            .exchange
            .begin(&mut self.store, self.session.session(), text)?;

        if let Some(message) = self.store.last() {
            self.events.emit(AppEvent::MessageAppended(message.clone()));
        }
        self.events.emit(AppEvent::InputChanged(String::new()));
        self.events.emit(AppEvent::AwaitingReply(true));
        Some(request)
    }

    /// Second half of [`AppState::send`]: appends the reply (or the error
    /// message), leaves the pending state and routes side channels.
    pub fn finish_send(&mut self, result: Result<ChatReply, AssistantError>) {
        let outcome = self.exchange.complete(&mut self.store, result);

        if let Some(message) = self.store.last() {
            self.events.emit(AppEvent::MessageAppended(message.clone()));
        }
        self.events.emit(AppEvent::AwaitingReply(false));

        let ExchangeOutcome::Replied(channels) = outcome else {
            return;
        };

        if let Some(confirmation) = channels.booking_confirmation {
            self.confirm_booking(confirmation);
        } else if let Some(slots) = channels.suggested_slots {
            self.offer_slots(slots);
        }
    }

    /// Send the canned utterance for a quick-action token
    pub async fn quick_action(&mut self, token: &str) -> bool {
        let request = self.begin_quick_action(token);
        self.dispatch(request).await
    }

    pub fn begin_quick_action(&mut self, token: &str) -> Option<ChatRequest> {
        let utterance = quick_action_utterance(token);
        self.begin_send(&utterance)
    }

    /// The backend exchanges are sent to
    pub fn backend(&self) -> Arc<dyn ChatBackend> {
        Arc::clone(&self.backend)
    }

    // -- scheduling ----------------------------------------------------------

    fn offer_slots(&mut self, slots: Vec<SuggestedSlot>) {
        if self.scheduling.offer(slots) {
            self.events
                .emit(AppEvent::SlotsOffered(self.scheduling.slots().to_vec()));
        }
    }

    /// Pick a slot from the current offer and ask to book it.
    ///
    /// The offer is consumed before the send, whatever the send's outcome.
    /// A slot outside the offer is ignored.
    pub async fn select_slot(&mut self, slot: &SuggestedSlot) -> bool {
        let Some(utterance) = self.take_selection(|flow| flow.select(slot)) else {
            return false;
        };
        self.send(&utterance).await;
        true
    }

    /// Pick the `index`-th offered slot
    pub async fn select_slot_at(&mut self, index: usize) -> bool {
        let Some(utterance) = self.take_selection(|flow| flow.select_index(index)) else {
            return false;
        };
        self.send(&utterance).await;
        true
    }

    /// Synchronous half of [`AppState::select_slot_at`]. `None` means either
    /// no such slot or a send that could not start.
    pub fn begin_select_slot_at(&mut self, index: usize) -> Option<ChatRequest> {
        let utterance = self.take_selection(|flow| flow.select_index(index))?;
        self.begin_send(&utterance)
    }

    fn take_selection(
        &mut self,
        select: impl FnOnce(&mut SchedulingFlow) -> Option<String>,
    ) -> Option<String> {
        let utterance = select(&mut self.scheduling)?;
        self.events.emit(AppEvent::SlotsCleared);
        Some(utterance)
    }

    /// Close the slot picker without choosing
    pub fn dismiss_slots(&mut self) {
        if self.scheduling.dismiss() {
            self.events.emit(AppEvent::SlotsCleared);
        }
    }

    // -- navigation ----------------------------------------------------------

    fn confirm_booking(&mut self, confirmation: BookingConfirmation) {
        let was_offering = self.scheduling.is_offering();
        self.navigator
            .confirm_booking(confirmation.clone(), &mut self.scheduling);

        if was_offering {
            self.events.emit(AppEvent::SlotsCleared);
        }
        self.events.emit(AppEvent::BookingConfirmed(confirmation));
        self.events.emit(AppEvent::ViewChanged(ViewState::Confirmation));
        self.events.emit(AppEvent::Notification {
            level: NotificationLevel::Success,
            text: BOOKING_SUCCESS_NOTICE.to_string(),
        });
    }

    pub fn go_to(&mut self, view: ViewState) -> Result<(), AssistantError> {
        self.navigator.go_to(view)?;
        self.events.emit(AppEvent::ViewChanged(view));
        Ok(())
    }

    pub fn return_to_conversation(&mut self) {
        debug!("returning to conversation");
        self.navigator.return_to_conversation();
        self.events
            .emit(AppEvent::ViewChanged(ViewState::Conversation));
    }

    /// Write the held confirmation as an iCalendar file
    pub fn export_calendar(&self, path: &Path) -> Result<(), AssistantError> {
        let confirmation = self.navigator.confirmation().ok_or_else(|| {
            AssistantError::Navigation("no booking confirmation to export".to_string())
        })?;
        std::fs::write(path, confirmation.to_ics())?;
        info!(path = %path.display(), booking_id = %confirmation.booking_id, "calendar exported");
        Ok(())
    }

    // -- read access ---------------------------------------------------------

    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.session()
    }

    pub fn session_status(&self) -> &SessionStatus {
        self.session.status()
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.exchange.is_awaiting_reply()
    }

    pub fn offered_slots(&self) -> &[SuggestedSlot] {
        self.scheduling.slots()
    }

    pub fn scheduling(&self) -> &SchedulingFlow {
        &self.scheduling
    }

    pub fn current_view(&self) -> ViewState {
        self.navigator.current_view()
    }

    pub fn confirmation(&self) -> Option<&BookingConfirmation> {
        self.navigator.confirmation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{InitResponse, MockChatBackend, PatientInfo};
    use crate::conversation::SchedulingState;
    use pretty_assertions::assert_eq;

    fn expect_init_ok(backend: &mut MockChatBackend) {
        backend.expect_init_session().times(1).returning(|| {
            Ok(InitResponse {
                session_id: "s1".into(),
                user_id: "u1".into(),
            })
        });
    }

    fn confirmation(id: &str) -> BookingConfirmation {
        BookingConfirmation {
            booking_id: id.to_string(),
            appointment_date: "2024-06-01".into(),
            appointment_time: "10:00".into(),
            appointment_type: "general_consultation".into(),
            duration_minutes: 30,
            created_at: Some("2024-05-20T09:00:00".into()),
            patient_info: PatientInfo {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: "ada@example.com".into(),
                phone: "555-0100".into(),
            },
        }
    }

    async fn ready_state(backend: MockChatBackend) -> AppState {
        let mut state = AppState::new(Arc::new(backend));
        state.initialize().await.unwrap();
        state
    }

    fn drain(rx: &mut broadcast::Receiver<AppEvent>) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_welcome_seeded_once() {
        let mut backend = MockChatBackend::new();
        expect_init_ok(&mut backend);
        backend
            .expect_send_message()
            .returning(|_| Ok(ChatReply::text("ok")));

        let mut state = ready_state(backend).await;
        assert_eq!(state.messages().len(), 1);
        assert!(state.messages()[0].is_welcome());

        state.send("hello").await;
        // A repeated initialize replays the outcome and must not re-seed
        state.initialize().await.unwrap();
        assert_eq!(state.messages().iter().filter(|m| m.is_welcome()).count(), 1);
    }

    #[tokio::test]
    async fn test_repeated_initialize_publishes_once() {
        let mut backend = MockChatBackend::new();
        expect_init_ok(&mut backend);

        let mut state = AppState::new(Arc::new(backend));
        let mut rx = state.subscribe();
        state.initialize().await.unwrap();
        state.initialize().await.unwrap();

        let ready = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, AppEvent::SessionReady { .. }))
            .count();
        assert_eq!(ready, 1);
    }

    #[tokio::test]
    async fn test_init_failure_notified_once() {
        let mut backend = MockChatBackend::new();
        backend
            .expect_init_session()
            .times(1)
            .returning(|| Err(AssistantError::Network("refused".into())));

        let mut state = AppState::new(Arc::new(backend));
        let mut rx = state.subscribe();
        assert!(state.initialize().await.is_err());
        assert!(state.initialize().await.is_err());

        let notices = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, AppEvent::Notification { level: NotificationLevel::Error, .. }))
            .count();
        assert_eq!(notices, 1);
    }

    #[tokio::test]
    async fn test_select_unoffered_slot_is_noop() {
        let mut backend = MockChatBackend::new();
        expect_init_ok(&mut backend);
        backend.expect_send_message().times(1).returning(|_| {
            Ok(ChatReply::text("slots")
                .with_slots(vec![SuggestedSlot::new("2024-06-01", "10:00")]))
        });

        let mut state = ready_state(backend).await;
        state.send("slots please").await;
        let mut rx = state.subscribe();

        assert!(!state.select_slot(&SuggestedSlot::new("1999-01-01", "03:00")).await);
        assert!(!state.select_slot_at(3).await);
        assert_eq!(state.offered_slots().len(), 1);
        assert_eq!(state.messages().len(), 3);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_export_calendar_requires_confirmation() {
        let mut backend = MockChatBackend::new();
        expect_init_ok(&mut backend);
        backend
            .expect_send_message()
            .returning(|_| Ok(ChatReply::text("Booked!").with_confirmation(confirmation("b7"))));

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("appointment.ics");

        let mut state = ready_state(backend).await;
        assert!(matches!(
            state.export_calendar(&path),
            Err(AssistantError::Navigation(_))
        ));
        assert!(!path.exists());

        state.send("book it").await;
        state.export_calendar(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("UID:b7@medassist"));

        let missing_dir = dir.path().join("missing").join("appointment.ics");
        assert!(matches!(
            state.export_calendar(&missing_dir),
            Err(AssistantError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_begin_select_slot_at() {
        let mut backend = MockChatBackend::new();
        expect_init_ok(&mut backend);
        backend.expect_send_message().times(1).returning(|_| {
            Ok(ChatReply::text("slots").with_slots(vec![SuggestedSlot::new("d", "t")]))
        });

        let mut state = ready_state(backend).await;
        state.send("slots").await;

        assert!(state.begin_select_slot_at(1).is_none());
        assert!(state.scheduling().is_offering());

        let request = state.begin_select_slot_at(0).unwrap();
        assert_eq!(request.message, "I would like to book the appointment on d at t");
        assert!(!state.scheduling().is_offering());
        assert!(state.is_awaiting_reply());
    }

    #[tokio::test]
    async fn test_log_grows_by_two_per_send() {
        let mut backend = MockChatBackend::new();
        expect_init_ok(&mut backend);
        let mut calls = 0;
        backend.expect_send_message().times(6).returning(move |_| {
            calls += 1;
            if calls % 3 == 0 {
                Err(AssistantError::Network("reset".into()))
            } else {
                Ok(ChatReply::text(format!("reply {}", calls)))
            }
        });

        let mut state = ready_state(backend).await;
        for n in 1..=6 {
            assert!(state.send(&format!("message {}", n)).await);
            assert_eq!(state.messages().len(), 1 + 2 * n);
        }
        assert_eq!(state.messages().iter().filter(|m| m.is_error).count(), 2);
    }

    #[tokio::test]
    async fn test_blank_send_is_noop() {
        let mut backend = MockChatBackend::new();
        expect_init_ok(&mut backend);
        backend.expect_send_message().never();

        let mut state = ready_state(backend).await;
        let mut rx = state.subscribe();

        assert!(!state.send("").await);
        assert!(!state.send("   ").await);
        assert_eq!(state.messages().len(), 1);
        assert!(!state.is_awaiting_reply());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_request_carries_session_identity() {
        let mut backend = MockChatBackend::new();
        expect_init_ok(&mut backend);
        backend
            .expect_send_message()
            .withf(|req| req.message == "hello" && req.session_id == "s1" && req.user_id == "u1")
            .times(1)
            .returning(|_| Ok(ChatReply::text("hi")));

        let mut state = ready_state(backend).await;
        state.set_input("hello");
        assert!(state.can_send());
        assert!(state.submit_input().await);
        assert_eq!(state.input(), "");
    }

    #[tokio::test]
    async fn test_awaiting_reply_between_halves() {
        let mut backend = MockChatBackend::new();
        expect_init_ok(&mut backend);

        let mut state = ready_state(backend).await;
        let request = state.begin_send("hello").unwrap();
        assert_eq!(request.message, "hello");
        assert!(state.is_awaiting_reply());
        assert!(state.begin_send("again").is_none());

        state.finish_send(Ok(ChatReply::text("hi")));
        assert!(!state.is_awaiting_reply());
        assert_eq!(state.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_select_slot_clears_offer_even_on_failure() {
        let mut backend = MockChatBackend::new();
        expect_init_ok(&mut backend);
        let mut first = true;
        backend.expect_send_message().times(2).returning(move |_| {
            if std::mem::take(&mut first) {
                Ok(ChatReply::text("slots")
                    .with_slots(vec![SuggestedSlot::new("2024-06-01", "10:00")]))
            } else {
                Err(AssistantError::Status(500))
            }
        });

        let mut state = ready_state(backend).await;
        state.quick_action("check_availability").await;
        assert_eq!(state.offered_slots().len(), 1);

        assert!(state.select_slot_at(0).await);
        assert_eq!(state.scheduling().state(), &SchedulingState::Inactive);
        assert!(state.messages().last().unwrap().is_error);
    }

    #[tokio::test]
    async fn test_confirmation_wins_over_slots_in_same_reply() {
        let mut backend = MockChatBackend::new();
        expect_init_ok(&mut backend);
        backend.expect_send_message().returning(|_| {
            Ok(ChatReply::text("Booked!")
                .with_slots(vec![SuggestedSlot::new("d", "t")])
                .with_confirmation(confirmation("b9")))
        });

        let mut state = ready_state(backend).await;
        state.send("book it").await;
        assert_eq!(state.current_view(), ViewState::Confirmation);
        assert!(!state.scheduling().is_offering());
        // The message still carries the slots verbatim
        assert_eq!(
            state.messages().last().unwrap().suggested_slots.as_ref().map(Vec::len),
            Some(1)
        );
    }

    #[tokio::test]
    async fn test_confirm_booking_terminates_offer() {
        let mut backend = MockChatBackend::new();
        expect_init_ok(&mut backend);
        let mut calls = 0;
        backend.expect_send_message().returning(move |_| {
            calls += 1;
            match calls {
                1 => Ok(ChatReply::text("slots")
                    .with_slots(vec![SuggestedSlot::new("d1", "t1"), SuggestedSlot::new("d2", "t2")])),
                _ => Ok(ChatReply::text("Booked!").with_confirmation(confirmation("b2"))),
            }
        });

        let mut state = ready_state(backend).await;
        state.go_to(ViewState::Faq).unwrap();
        state.send("slots please").await;
        assert!(state.scheduling().is_offering());

        // Booking arrives through free text while the picker is still open
        state.send("the second one").await;
        assert_eq!(state.current_view(), ViewState::Confirmation);
        assert_eq!(state.scheduling().state(), &SchedulingState::Inactive);
        assert_eq!(state.confirmation().unwrap().booking_id, "b2");
    }

    #[tokio::test]
    async fn test_dismiss_slots() {
        let mut backend = MockChatBackend::new();
        expect_init_ok(&mut backend);
        backend.expect_send_message().times(1).returning(|_| {
            Ok(ChatReply::text("slots").with_slots(vec![SuggestedSlot::new("d", "t")]))
        });

        let mut state = ready_state(backend).await;
        state.send("slots").await;
        let mut rx = state.subscribe();
        state.dismiss_slots();
        assert!(state.offered_slots().is_empty());
        assert_eq!(drain(&mut rx), vec![AppEvent::SlotsCleared]);
        assert_eq!(state.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_navigation_and_return() {
        let mut backend = MockChatBackend::new();
        expect_init_ok(&mut backend);
        backend
            .expect_send_message()
            .returning(|_| Ok(ChatReply::text("Booked!").with_confirmation(confirmation("b1"))));

        let mut state = ready_state(backend).await;
        assert!(state.go_to(ViewState::Confirmation).is_err());

        state.send("book").await;
        state.go_to(ViewState::Faq).unwrap();
        state.go_to(ViewState::Confirmation).unwrap();
        assert_eq!(state.confirmation().unwrap().booking_id, "b1");

        state.return_to_conversation();
        assert_eq!(state.current_view(), ViewState::Conversation);
        assert!(state.confirmation().is_none());
    }

    // Init, then a reply that offers slots
    #[tokio::test]
    async fn test_scenario_offer_slots() {
        let mut backend = MockChatBackend::new();
        expect_init_ok(&mut backend);
        backend
            .expect_send_message()
            .withf(|req| req.message == "I want to schedule an appointment")
            .times(1)
            .returning(|_| {
                Ok(ChatReply::text("Here are some slots")
                    .with_slots(vec![SuggestedSlot::new("2024-06-01", "10:00")]))
            });

        let mut state = ready_state(backend).await;
        assert_eq!(state.messages().len(), 1);

        state.send("I want to schedule an appointment").await;
        assert_eq!(state.messages().len(), 3);
        assert_eq!(
            state.scheduling().state(),
            &SchedulingState::Offering(vec![SuggestedSlot::new("2024-06-01", "10:00")])
        );
    }

    // Selecting the offered slot leads to a confirmation
    #[tokio::test]
    async fn test_scenario_select_slot_and_book() {
        let mut backend = MockChatBackend::new();
        expect_init_ok(&mut backend);
        backend
            .expect_send_message()
            .withf(|req| req.message == "I want to schedule an appointment")
            .times(1)
            .returning(|_| {
                Ok(ChatReply::text("Here are some slots")
                    .with_slots(vec![SuggestedSlot::new("2024-06-01", "10:00")]))
            });
        backend
            .expect_send_message()
            .withf(|req| req.message == "I would like to book the appointment on 2024-06-01 at 10:00")
            .times(1)
            .returning(|_| Ok(ChatReply::text("Booked!").with_confirmation(confirmation("b1"))));

        let mut state = ready_state(backend).await;
        state.send("I want to schedule an appointment").await;

        let mut rx = state.subscribe();
        let slot = state.offered_slots()[0].clone();
        assert!(state.select_slot(&slot).await);

        assert!(!state.scheduling().is_offering());
        assert_eq!(state.current_view(), ViewState::Confirmation);
        assert_eq!(state.confirmation().unwrap().booking_id, "b1");

        let user_message = &state.messages()[3];
        assert!(user_message.is_user());
        assert_eq!(
            user_message.text,
            "I would like to book the appointment on 2024-06-01 at 10:00"
        );

        let events = drain(&mut rx);
        assert_eq!(events.first(), Some(&AppEvent::SlotsCleared));
        assert!(events.contains(&AppEvent::ViewChanged(ViewState::Confirmation)));
        assert!(events.contains(&AppEvent::Notification {
            level: NotificationLevel::Success,
            text: BOOKING_SUCCESS_NOTICE.to_string(),
        }));
    }

    // Exchange failure yields exactly one error message
    #[tokio::test]
    async fn test_scenario_exchange_failure() {
        let mut backend = MockChatBackend::new();
        expect_init_ok(&mut backend);
        backend
            .expect_send_message()
            .times(1)
            .returning(|_| Err(AssistantError::Network("connection reset".into())));

        let mut state = ready_state(backend).await;
        let mut rx = state.subscribe();
        state.send("hello").await;

        assert_eq!(state.messages().len(), 3);
        let last = state.messages().last().unwrap();
        assert!(last.is_error);
        assert!(!last.is_user());
        assert!(!state.is_awaiting_reply());

        state.set_input("retry");
        assert!(state.can_send());

        let events = drain(&mut rx);
        assert_eq!(events[2], AppEvent::AwaitingReply(true));
        assert!(events.contains(&AppEvent::AwaitingReply(false)));
    }

    // Init failure disables the conversation
    #[tokio::test]
    async fn test_scenario_init_failure() {
        let mut backend = MockChatBackend::new();
        backend
            .expect_init_session()
            .times(1)
            .returning(|| Err(AssistantError::Status(500)));
        backend.expect_send_message().never();

        let mut state = AppState::new(Arc::new(backend));
        let mut rx = state.subscribe();
        assert!(state.initialize().await.is_err());

        assert!(!state.send("hello").await);
        assert!(state.messages().is_empty());
        assert!(state.session().is_none());
        assert!(matches!(state.session_status(), SessionStatus::Failed(_)));

        state.set_input("hello");
        assert!(!state.can_send());

        assert_eq!(
            rx.try_recv().unwrap(),
            AppEvent::Notification {
                level: NotificationLevel::Error,
                text: INIT_FAILURE_NOTICE.to_string(),
            }
        );
    }
}
