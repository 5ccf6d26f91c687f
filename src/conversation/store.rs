use super::message::Message;

/// Append-only, insertion-ordered log of the conversation
#[derive(Debug, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return the updated log
    pub fn append(&mut self, message: Message) -> &[Message] {
        self.messages.push(message);
        &self.messages
    }

    /// Seed the welcome message if nothing has been said yet
    pub fn seed_welcome(&mut self) -> Option<&Message> {
        if !self.messages.is_empty() {
            return None;
        }
        self.messages.push(Message::welcome());
        self.messages.last()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
