//! Chat sessions and the driver state machine
//!
//! A [`ChatSession`] owns everything one conversation needs: the roster, the
//! group chat and the driver state. The console loop and every relay
//! connection each build their own session; nothing is global.

pub mod relay;
pub mod repl;

pub use relay::RelaySink;
pub use repl::{run_console, ConsoleSink};

use crate::agent::build_roster;
use crate::chat::{AgentGroupChat, Message, PromptTermination, RoundTermination, TurnEnd};
use crate::config::{Config, TerminationMode};
use crate::error::{AgentError, ConfigError};
use crate::llm::CompletionService;
use futures::StreamExt;
use std::sync::Arc;
use uuid::Uuid;

/// What a line of user input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// Blank or whitespace only
    Empty,
    /// Leave the session
    Exit,
    /// Forward to the group chat
    Message(String),
}

/// Classify a raw input line. `exit` is matched after trimming, ignoring case.
pub fn classify_input(line: &str) -> UserInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        UserInput::Empty
    } else if trimmed.eq_ignore_ascii_case("exit") {
        UserInput::Exit
    } else {
        UserInput::Message(trimmed.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Running,
    Terminated,
}

/// Receives what a turn produces
pub trait ReplySink {
    fn on_reply(&mut self, message: &Message);
    fn on_error(&mut self, error: &AgentError);
    fn on_turn_end(&mut self, _end: TurnEnd) {}
}

pub struct ChatSession {
    id: Uuid,
    chat: AgentGroupChat,
    state: DriverState,
}

impl ChatSession {
    /// Build the roster and group chat described by `config` around a shared
    /// completion service.
    pub fn new(config: &Config, service: Arc<dyn CompletionService>) -> Result<Self, ConfigError> {
        config.validate()?;
        let roster = config.roster()?;
        let agents = build_roster(config, service.clone())?;

        let builder = AgentGroupChat::builder(agents)
            .maximum_iterations(config.chat.maximum_iterations)
            .history_window(config.chat.history_window);

        let builder = match config.termination.mode {
            TerminationMode::Prompt => {
                let watched = config.termination_roles(&roster)?;
                let mut termination =
                    PromptTermination::new(service, config.termination.sentinel.clone())
                        .with_agents(watched.iter().map(|r| r.name()));
                if let Some(template) = &config.termination.prompt {
                    termination = termination.with_template(template.clone());
                }
                builder.termination(termination)
            }
            TerminationMode::Rounds => {
                builder.termination(RoundTermination::new(roster.iter().map(|r| r.name())))
            }
        };

        let session = Self::from_chat(builder.build());
        tracing::info!(
            session = %session.id,
            agents = ?roster.iter().map(|r| r.name()).collect::<Vec<_>>(),
            termination = %config.termination.mode,
            "session started"
        );
        Ok(session)
    }

    pub fn from_chat(chat: AgentGroupChat) -> Self {
        Self {
            id: Uuid::new_v4(),
            chat,
            state: DriverState::Running,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn chat(&self) -> &AgentGroupChat {
        &self.chat
    }

    /// Advance the driver by one line of input.
    ///
    /// Failures of the group chat are reported to `sink` and leave the
    /// session running. Once terminated, further input is ignored.
    pub async fn handle_input<S>(&mut self, line: &str, sink: &mut S) -> DriverState
    where
        S: ReplySink + Send + ?Sized,
    {
        if self.state == DriverState::Terminated {
            return self.state;
        }

        match classify_input(line) {
            UserInput::Empty => {}
            UserInput::Exit => {
                tracing::info!(session = %self.id, "user exited");
                self.state = DriverState::Terminated;
            }
            UserInput::Message(text) => {
                self.chat.add_user_message(text);
                {
                    let replies = self.chat.invoke();
                    futures::pin_mut!(replies);
                    while let Some(item) = replies.next().await {
                        match item {
                            Ok(message) => sink.on_reply(&message),
                            Err(e) => {
                                if e.is_transient() {
                                    tracing::warn!(session = %self.id, error = %e, "turn failed");
                                } else {
                                    tracing::error!(session = %self.id, error = %e, "turn failed");
                                }
                                sink.on_error(&e);
                            }
                        }
                    }
                }
                if let Some(end) = self.chat.last_turn() {
                    sink.on_turn_end(end);
                }
            }
        }

        self.state
    }
}
