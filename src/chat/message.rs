use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => f.write_str("user"),
            MessageRole::Assistant => f.write_str("assistant"),
        }
    }
}

/// Whether a message belongs to the conversation or is UI-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Conversation,
    /// Welcome text shown when a session starts.
    Greeting,
    /// Configuration problems such as a relay without a credential.
    Notice,
    /// A request that ended in an error.
    Failure,
}

/// A chat message as the UI shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub text: String,
    pub kind: MessageKind,
}

impl Message {
    fn assistant_with(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            text: text.into(),
            kind,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
            kind: MessageKind::Conversation,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::assistant_with(MessageKind::Conversation, text)
    }

    pub fn greeting(text: impl Into<String>) -> Self {
        Self::assistant_with(MessageKind::Greeting, text)
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self::assistant_with(MessageKind::Notice, text)
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self::assistant_with(MessageKind::Failure, text)
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind != MessageKind::Conversation
    }
}
