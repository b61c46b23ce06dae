//! Deciding when a turn is over
//!
//! [`PromptTermination`] asks the model and looks for a sentinel word in its
//! verdict. Anything that does not contain the sentinel counts as "not done",
//! including empty or garbled output. [`RoundTermination`] answers the same
//! question without a model call.

use super::ChatHistory;
use crate::agent::Agent;
use crate::error::Result;
use crate::llm::{ChatMessage, CompletionService};
use async_trait::async_trait;
use std::sync::Arc;

/// Placeholder replaced with the latest message content
pub const LAST_MESSAGE_VAR: &str = "{{$lastmessage}}";

/// Placeholder replaced with the sentinel word
pub const SENTINEL_VAR: &str = "{{$sentinel}}";

pub const DEFAULT_TERMINATION_PROMPT: &str = "\
Determine whether the user's request has been fulfilled or the user has left the chat.
The request is fulfilled once every participant has responded once in this turn.
No agent should take more than one turn to respond to the user.
If the request is fulfilled, or the user has exited the chat, reply with the single word {{$sentinel}}.
Otherwise reply with the single word continue.

Response:
{{$lastmessage}}";

#[async_trait]
pub trait TerminationStrategy: Send + Sync {
    /// Called after `agent` has appended its message to `history`
    async fn should_terminate(&self, agent: &Agent, history: &ChatHistory) -> Result<bool>;
}

/// True iff `sentinel` occurs in `output`, ignoring case.
pub fn is_termination_signal(output: &str, sentinel: &str) -> bool {
    let sentinel = sentinel.trim().to_lowercase();
    !sentinel.is_empty() && output.to_lowercase().contains(&sentinel)
}

/// Model-evaluated termination rule
pub struct PromptTermination {
    service: Arc<dyn CompletionService>,
    template: String,
    sentinel: String,
    agents: Option<Vec<String>>,
}

impl PromptTermination {
    pub fn new(service: Arc<dyn CompletionService>, sentinel: impl Into<String>) -> Self {
        Self {
            service,
            template: DEFAULT_TERMINATION_PROMPT.to_string(),
            sentinel: sentinel.into(),
            agents: None,
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Only check after turns by these agents
    pub fn with_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.agents = Some(agents.into_iter().map(Into::into).collect());
        self
    }

    pub fn render(&self, last_message: &str) -> String {
        self.template
            .replace(SENTINEL_VAR, &self.sentinel)
            .replace(LAST_MESSAGE_VAR, last_message)
    }

    fn applies_to(&self, agent: &Agent) -> bool {
        self.agents
            .as_ref()
            .map_or(true, |names| names.iter().any(|n| n == agent.name()))
    }
}

#[async_trait]
impl TerminationStrategy for PromptTermination {
    async fn should_terminate(&self, agent: &Agent, history: &ChatHistory) -> Result<bool> {
        if !self.applies_to(agent) {
            return Ok(false);
        }
        let Some(last) = history.last() else {
            return Ok(false);
        };

        let prompt = self.render(&last.content);
        let verdict = self.service.complete(&[ChatMessage::user(prompt)]).await?;
        let done = is_termination_signal(&verdict, &self.sentinel);
        tracing::debug!(agent = %agent.name(), done, verdict = %verdict.trim(), "termination check");
        Ok(done)
    }
}

/// Ends the turn once every listed agent has spoken since the last user
/// message.
#[derive(Debug, Clone)]
pub struct RoundTermination {
    agents: Vec<String>,
}

impl RoundTermination {
    pub fn new<I, S>(agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            agents: agents.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl TerminationStrategy for RoundTermination {
    async fn should_terminate(&self, _agent: &Agent, history: &ChatHistory) -> Result<bool> {
        let recent = history.since_last_user();
        Ok(self
            .agents
            .iter()
            .all(|name| recent.iter().any(|m| m.sender.agent_name() == Some(name.as_str()))))
    }
}
