use paperwhisperer_llm::ProviderMessage;

use super::message::{Message, Role};

/// Ordered, append-only transcript.
///
/// The first element is always the seeded system message; later messages are
/// user and assistant turns only. This is also the exact payload sent to the
/// completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    /// Creates a history holding exactly one system message.
    pub fn seeded(context: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(context)],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false: a seeded history holds at least the system message.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn system_message(&self) -> Option<&Message> {
        self.messages.first()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub(crate) fn append_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub(crate) fn append_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    pub fn to_provider_messages(&self) -> Vec<ProviderMessage> {
        self.messages.iter().map(ProviderMessage::from).collect()
    }
}

/// Contents of every message with `role`, in transcript order.
pub fn contents_by_role(messages: &[Message], role: Role) -> Vec<String> {
    messages
        .iter()
        .filter(|message| message.role == role)
        .map(|message| message.content.clone())
        .collect()
}

pub fn user_display(messages: &[Message]) -> Vec<String> {
    contents_by_role(messages, Role::User)
}

pub fn assistant_display(messages: &[Message]) -> Vec<String> {
    contents_by_role(messages, Role::Assistant)
}
