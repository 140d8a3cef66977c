use super::message::Role;

/// One message bubble in the rendered transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble<'a> {
    pub role: Role,
    pub content: &'a str,
}

impl<'a> Bubble<'a> {
    fn assistant(content: &'a str) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    fn user(content: &'a str) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self.role, Role::User)
    }
}

/// Orders the transcript newest exchange first.
///
/// Walks the assistant sequence from last to first and emits each reply
/// followed by the user message at the same index. Pairing is purely by
/// index, so a user message that never got a reply shifts the pairing of
/// later exchanges.
pub fn render_transcript<'a>(
    user_display: &'a [String],
    assistant_display: &'a [String],
) -> Vec<Bubble<'a>> {
    let mut bubbles = Vec::with_capacity(assistant_display.len() * 2);

    for (index, reply) in assistant_display.iter().enumerate().rev() {
        bubbles.push(Bubble::assistant(reply));
        if let Some(prompt) = user_display.get(index) {
            bubbles.push(Bubble::user(prompt));
        }
    }

    bubbles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn newest_exchange_is_rendered_first() {
        let users = strings(&["u0", "u1", "u2"]);
        let replies = strings(&["a0", "a1", "a2"]);

        let order = render_transcript(&users, &replies)
            .iter()
            .map(|bubble| bubble.content)
            .collect::<Vec<_>>();

        assert_eq!(order, vec!["a2", "u2", "a1", "u1", "a0", "u0"]);
    }

    #[test]
    fn replies_precede_their_prompts() {
        let users = strings(&["u0", "u1"]);
        let replies = strings(&["a0", "a1"]);
        let bubbles = render_transcript(&users, &replies);

        let roles = bubbles.iter().map(|bubble| bubble.role).collect::<Vec<_>>();
        assert_eq!(
            roles,
            vec![Role::Assistant, Role::User, Role::Assistant, Role::User]
        );
        assert!(!bubbles[0].is_user());
        assert!(bubbles[1].is_user());
    }

    #[test]
    fn nothing_renders_before_the_first_reply() {
        let users = strings(&["pending"]);
        assert!(render_transcript(&users, &[]).is_empty());
        assert!(render_transcript(&[], &[]).is_empty());
    }

    #[test]
    fn pairing_is_by_index_after_an_unanswered_prompt() {
        // u0 never got a reply; u1 did.
        let users = strings(&["u0", "u1"]);
        let replies = strings(&["a1"]);

        let order = render_transcript(&users, &replies)
            .iter()
            .map(|bubble| bubble.content)
            .collect::<Vec<_>>();

        assert_eq!(order, vec!["a1", "u0"]);
    }
}
