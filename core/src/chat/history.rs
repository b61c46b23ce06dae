//! Shared conversation history
//!
//! Append-only for the lifetime of a session. The window only limits what is
//! sent to the model; stored messages are never dropped.

use serde::{Deserialize, Serialize};

/// Who wrote a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Sender {
    User,
    Agent(String),
}

impl Sender {
    pub fn agent_name(&self) -> Option<&str> {
        match self {
            Sender::User => None,
            Sender::Agent(name) => Some(name),
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Agent(name) => write!(f, "{}", name),
        }
    }
}

/// One entry of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            content: content.into(),
        }
    }

    pub fn agent(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: Sender::Agent(name.into()),
            content: content.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Ordered, append-only message log
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    messages: Vec<Message>,
    window: Option<usize>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// History that exposes at most `window` trailing messages to the model
    pub fn with_window(window: Option<usize>) -> Self {
        Self {
            messages: Vec::new(),
            window: window.filter(|w| *w > 0),
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
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

    /// Trailing slice sent to the model
    pub fn window(&self) -> &[Message] {
        match self.window {
            Some(n) if n < self.messages.len() => &self.messages[self.messages.len() - n..],
            _ => &self.messages,
        }
    }

    /// Messages written since the most recent user message (excluding it)
    pub fn since_last_user(&self) -> &[Message] {
        match self.messages.iter().rposition(Message::is_user) {
            Some(idx) => &self.messages[idx + 1..],
            None => &self.messages,
        }
    }
}
