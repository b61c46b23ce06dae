pub mod agent;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod protocol;
pub mod session;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-exports for convenience
pub use agent::{Agent, AgentRole};
pub use chat::AgentGroupChat;
pub use config::Config;
pub use error::{AgentError, ConfigError};
pub use session::ChatSession;
