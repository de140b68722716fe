use super::message::{Message, MessageRole};
use crate::providers::gemini::types::{Content, Part, Role};

/// Build provider turns from the UI message list.
///
/// Placeholders (greeting, notices, surfaced failures) are dropped; every other
/// message becomes one single-text-part turn, in order.
pub fn to_turns(messages: &[Message]) -> Vec<Content> {
    messages
        .iter()
        .filter(|message| !message.is_placeholder())
        .map(|message| {
            Content::new(
                provider_role(message.role),
                vec![Part::text(message.text.clone())],
            )
        })
        .collect()
}

/// Provider role for a UI role.
pub fn provider_role(role: MessageRole) -> Role {
    match role {
        MessageRole::User => Role::User,
        MessageRole::Assistant => Role::Model,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn placeholders_are_never_replayed() {
        let messages = vec![
            Message::greeting("Hi! I can manage your invoices."),
            Message::notice("The assistant is unavailable."),
            Message::user("list my invoices"),
            Message::failure("Sorry, the request failed."),
            Message::assistant("You have no invoices yet."),
            Message::user("create one for Alice"),
        ];

        let turns = to_turns(&messages);
        assert_eq!(
            turns,
            vec![
                Content::user_text("list my invoices"),
                Content::model_text("You have no invoices yet."),
                Content::user_text("create one for Alice"),
            ]
        );
    }

    #[test]
    fn each_turn_has_a_single_text_part() {
        let turns = to_turns(&[Message::user("hello")]);
        assert_eq!(turns[0].role, Some(provider_role(MessageRole::User)));
        assert_eq!(turns[0].parts, vec![Part::text("hello")]);
    }
}
