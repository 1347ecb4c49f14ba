use crate::models::message::Message;

/// An ordered in-memory message log.
///
/// `set_history` is reset-then-add, so a caller that needs atomicity across a
/// failing multi-message add should snapshot with `get_history` first.
#[derive(Debug, Default, Clone)]
pub struct Conversation {
    history: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_history(&mut self, messages: Vec<Message>) {
        self.reset();
        self.add_messages(messages);
    }

    pub fn add_message(&mut self, message: Message) {
        self.history.push(message);
    }

    pub fn add_messages(&mut self, messages: Vec<Message>) {
        self.history.extend(messages);
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// A defensive copy of the log; mutating it does not affect this
    /// conversation.
    pub fn get_history(&self) -> Vec<Message> {
        self.history.clone()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.history.last()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
