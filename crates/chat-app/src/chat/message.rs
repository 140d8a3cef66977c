use paperwhisperer_llm::ProviderMessage;

pub use paperwhisperer_llm::Role;

/// One role-tagged utterance. Never edited after creation; the history only
/// hands out shared references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

impl From<&Message> for ProviderMessage {
    fn from(message: &Message) -> Self {
        ProviderMessage::new(message.role, message.content.clone())
    }
}

impl From<ProviderMessage> for Message {
    fn from(message: ProviderMessage) -> Self {
        Self::new(message.role, message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_conversion_keeps_role_and_content() {
        let message = Message::user("Summarize section 2");
        let provider_message = ProviderMessage::from(&message);
        assert_eq!(provider_message.role, Role::User);
        assert_eq!(provider_message.content, "Summarize section 2");

        let back = Message::from(provider_message);
        assert_eq!(back, message);
    }
}
