//! Group chat: shared history, speaker selection and turn termination

pub mod group;
pub mod history;
pub mod selection;
pub mod termination;

pub use group::{AgentGroupChat, AgentGroupChatBuilder, TurnEnd};
pub use history::{ChatHistory, Message, Sender};
pub use selection::{SelectionStrategy, SequentialSelection};
pub use termination::{is_termination_signal, PromptTermination, RoundTermination, TerminationStrategy};
