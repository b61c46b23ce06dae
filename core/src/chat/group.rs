//! # Agent Group Chat
//!
//! An explicit turn loop over a roster of agents sharing one history.
//!
//! One call to [`AgentGroupChat::invoke`] is one turn:
//!
//! 1. the completion flag is cleared and selection restarts,
//! 2. the selection strategy picks the next agent,
//! 3. the agent's reply is appended to the history and yielded,
//! 4. the termination strategy is consulted; a positive verdict ends the
//!    turn, otherwise the loop continues at 2 until `maximum_iterations`
//!    agent replies have been produced.
//!
//! A failure at any step is yielded as the last item of the stream. Replies
//! yielded before the failure stay in the history.

use super::selection::{SelectionStrategy, SequentialSelection};
use super::termination::{RoundTermination, TerminationStrategy};
use super::{ChatHistory, Message};
use crate::agent::Agent;
use crate::config::DEFAULT_MAX_ITERATIONS;
use crate::error::{AgentError, Result};
use async_stream::try_stream;
use futures::Stream;

/// How the most recent turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEnd {
    /// The termination strategy fired
    Terminated,
    /// `maximum_iterations` replies were produced without termination
    IterationLimit,
    /// An agent or the termination check failed
    Failed,
}

pub struct AgentGroupChat {
    agents: Vec<Agent>,
    history: ChatHistory,
    selection: Box<dyn SelectionStrategy>,
    termination: Box<dyn TerminationStrategy>,
    maximum_iterations: usize,
    is_complete: bool,
    last_turn: Option<TurnEnd>,
}

impl AgentGroupChat {
    pub fn builder(agents: Vec<Agent>) -> AgentGroupChatBuilder {
        AgentGroupChatBuilder::new(agents)
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Whether the termination strategy fired during the last turn
    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn last_turn(&self) -> Option<TurnEnd> {
        self.last_turn
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.history.push(Message::user(content));
    }

    /// Run one turn, yielding each agent reply as it is produced.
    pub fn invoke(&mut self) -> impl Stream<Item = Result<Message>> + Send + '_ {
        try_stream! {
            self.is_complete = false;
            self.last_turn = Some(TurnEnd::Failed);
            self.selection.reset();

            if self.agents.is_empty() {
                Err::<(), _>(AgentError::EmptyRoster)?;
            }

            let mut end = TurnEnd::IterationLimit;
            for iteration in 0..self.maximum_iterations {
                let idx = self.selection.next(&self.agents, &self.history);
                let agent = self.agents[idx].clone();

                let message = agent.invoke(&self.history).await?;
                tracing::info!(agent = %agent.name(), iteration, "agent replied");
                self.history.push(message.clone());
                yield message;

                if self.termination.should_terminate(&agent, &self.history).await? {
                    end = TurnEnd::Terminated;
                    break;
                }
            }

            if end == TurnEnd::IterationLimit {
                tracing::warn!(limit = self.maximum_iterations, "turn ended at iteration limit");
            }
            self.is_complete = end == TurnEnd::Terminated;
            self.last_turn = Some(end);
        }
    }
}

/// Builder for composing a group chat.
pub struct AgentGroupChatBuilder {
    agents: Vec<Agent>,
    selection: Option<Box<dyn SelectionStrategy>>,
    termination: Option<Box<dyn TerminationStrategy>>,
    maximum_iterations: usize,
    history_window: Option<usize>,
}

impl AgentGroupChatBuilder {
    pub fn new(agents: Vec<Agent>) -> Self {
        Self {
            agents,
            selection: None,
            termination: None,
            maximum_iterations: DEFAULT_MAX_ITERATIONS,
            history_window: None,
        }
    }

    pub fn selection(mut self, selection: impl SelectionStrategy + 'static) -> Self {
        self.selection = Some(Box::new(selection));
        self
    }

    pub fn termination(mut self, termination: impl TerminationStrategy + 'static) -> Self {
        self.termination = Some(Box::new(termination));
        self
    }

    pub fn maximum_iterations(mut self, limit: usize) -> Self {
        self.maximum_iterations = limit.max(1);
        self
    }

    pub fn history_window(mut self, window: Option<usize>) -> Self {
        self.history_window = window;
        self
    }

    /// Defaults: sequential selection, one round of the whole roster.
    pub fn build(self) -> AgentGroupChat {
        let termination = self.termination.unwrap_or_else(|| {
            Box::new(RoundTermination::new(
                self.agents.iter().map(|a| a.name().to_string()),
            ))
        });
        AgentGroupChat {
            agents: self.agents,
            history: ChatHistory::with_window(self.history_window),
            selection: self
                .selection
                .unwrap_or_else(|| Box::new(SequentialSelection::new())),
            termination,
            maximum_iterations: self.maximum_iterations,
            is_complete: false,
            last_turn: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentRole;
    use crate::chat::termination::PromptTermination;
    use crate::chat::Sender;
    use crate::llm::MessageRole;
    use crate::testing::ScriptedService;
    use futures::StreamExt;
    use std::sync::Arc;

    fn roster(service: Arc<ScriptedService>) -> Vec<Agent> {
        AgentRole::ALL
            .iter()
            .map(|r| Agent::from_role(*r, service.clone()))
            .collect()
    }

    async fn collect(chat: &mut AgentGroupChat) -> Vec<Result<Message>> {
        chat.invoke().collect().await
    }

    #[tokio::test]
    async fn test_one_round_in_roster_order() {
        let service = ScriptedService::new(["diseases", "vaccines", "booking"]);
        let mut chat = AgentGroupChat::builder(roster(service.clone())).build();

        chat.add_user_message("Nigeria, Lagos");
        let replies: Vec<Message> = collect(&mut chat)
            .await
            .into_iter()
            .collect::<Result<_>>()
            .unwrap();

        let senders: Vec<String> = replies.iter().map(|m| m.sender.to_string()).collect();
        assert_eq!(senders, vec!["disease_intelligent", "vaccine_locator", "vaccine_booker"]);
        assert!(chat.is_complete());
        assert_eq!(chat.last_turn(), Some(TurnEnd::Terminated));
        assert_eq!(chat.history().len(), 4);
    }

    #[tokio::test]
    async fn test_prompt_termination_only_after_booker() {
        // Agent calls carry a system prompt; termination checks do not.
        let service = ScriptedService::responding(|messages| {
            if messages[0].role == MessageRole::System {
                Ok(format!("reply to {}", messages.len()))
            } else {
                Ok("Done.".to_string())
            }
        });
        let termination =
            PromptTermination::new(service.clone(), "done").with_agents(["vaccine_booker"]);
        let mut chat = AgentGroupChat::builder(roster(service.clone()))
            .termination(termination)
            .build();

        chat.add_user_message("Kenya");
        let replies = collect(&mut chat).await;
        assert_eq!(replies.len(), 3);
        assert!(chat.is_complete());
        // three agent calls plus a single termination check
        assert_eq!(service.call_count(), 4);
    }

    #[tokio::test]
    async fn test_iteration_limit_caps_turn() {
        let service = ScriptedService::responding(|messages| {
            if messages[0].role == MessageRole::System {
                Ok("still talking".to_string())
            } else {
                Ok("continue".to_string())
            }
        });
        let termination = PromptTermination::new(service.clone(), "done");
        let mut chat = AgentGroupChat::builder(roster(service.clone()))
            .termination(termination)
            .maximum_iterations(5)
            .build();

        chat.add_user_message("Brazil");
        let replies = collect(&mut chat).await;
        assert_eq!(replies.len(), 5);
        assert!(!chat.is_complete());
        assert_eq!(chat.last_turn(), Some(TurnEnd::IterationLimit));
        // wrapped around to the first agent
        assert_eq!(
            replies[3].as_ref().unwrap().sender,
            Sender::Agent("disease_intelligent".to_string())
        );
    }

    #[tokio::test]
    async fn test_failure_ends_turn_but_keeps_earlier_replies() {
        let service = ScriptedService::from_results([
            Ok("Yellow fever".to_string()),
            Err("rate limited".to_string()),
        ]);
        let mut chat = AgentGroupChat::builder(roster(service)).build();

        chat.add_user_message("Ghana");
        let replies = collect(&mut chat).await;
        assert_eq!(replies.len(), 2);
        assert!(replies[0].is_ok());
        assert!(replies[1].as_ref().unwrap_err().to_string().contains("rate limited"));
        assert_eq!(chat.last_turn(), Some(TurnEnd::Failed));
        assert!(!chat.is_complete());
        assert_eq!(chat.history().len(), 2);
    }

    #[tokio::test]
    async fn test_completion_flag_resets_each_turn() {
        let service = ScriptedService::new(["a", "b", "c", "d"]);
        let agents = vec![
            Agent::from_role(AgentRole::DiseaseIntelligence, service.clone()),
            Agent::from_role(AgentRole::VaccineBooker, service.clone()),
        ];
        let mut chat = AgentGroupChat::builder(agents).build();

        chat.add_user_message("Peru");
        assert_eq!(collect(&mut chat).await.len(), 2);
        assert!(chat.is_complete());

        chat.add_user_message("Cusco");
        let second = collect(&mut chat).await;
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].as_ref().unwrap().content, "c");
        assert!(chat.is_complete());
        assert_eq!(chat.history().len(), 6);
    }

    #[tokio::test]
    async fn test_empty_roster_is_error() {
        let mut chat = AgentGroupChat::builder(Vec::new()).build();
        let replies = collect(&mut chat).await;
        assert_eq!(replies.len(), 1);
        assert!(matches!(replies[0], Err(AgentError::EmptyRoster)));
    }
}
