//! A prompt-defined agent bound to the shared completion service

use super::AgentRole;
use crate::chat::{ChatHistory, Message, Sender};
use crate::error::Result;
use crate::llm::{ChatMessage, CompletionService};
use std::sync::Arc;

/// A named role with static instructions. Holds no state of its own.
#[derive(Clone)]
pub struct Agent {
    name: String,
    instructions: String,
    service: Arc<dyn CompletionService>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("instructions", &self.instructions)
            .finish_non_exhaustive()
    }
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        service: Arc<dyn CompletionService>,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            service,
        }
    }

    /// Agent for a built-in role with its default instructions
    pub fn from_role(role: AgentRole, service: Arc<dyn CompletionService>) -> Self {
        Self::new(role.name(), role.instructions(), service)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Ask the model for this agent's next message.
    ///
    /// The returned message carries the model output unmodified.
    pub async fn invoke(&self, history: &ChatHistory) -> Result<Message> {
        let messages = self.build_messages(history);
        tracing::debug!(agent = %self.name, context = messages.len(), "invoking agent");
        let content = self.service.complete(&messages).await?;
        Ok(Message::agent(self.name.clone(), content))
    }

    /// System instructions followed by the history window, seen from this
    /// agent's point of view.
    pub fn build_messages(&self, history: &ChatHistory) -> Vec<ChatMessage> {
        let window = history.window();
        let mut messages = Vec::with_capacity(window.len() + 1);
        messages.push(ChatMessage::system(self.instructions.clone()));
        for message in window {
            let chat = match &message.sender {
                Sender::User => ChatMessage::user(message.content.clone()),
                Sender::Agent(name) if *name == self.name => ChatMessage::assistant(message.content.clone()),
                Sender::Agent(name) => ChatMessage::user(message.content.clone()).with_name(name.clone()),
            };
            messages.push(chat);
        }
        messages
    }
}
