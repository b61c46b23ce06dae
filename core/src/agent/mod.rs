//! Agents of the travel-health group chat

pub mod core;
pub mod role;

pub use self::core::Agent;
pub use role::AgentRole;

use crate::config::Config;
use crate::error::ConfigError;
use crate::llm::CompletionService;
use std::sync::Arc;

/// Build the configured roster, in turn order, sharing one service handle.
pub fn build_roster(
    config: &Config,
    service: Arc<dyn CompletionService>,
) -> Result<Vec<Agent>, ConfigError> {
    let agents = config
        .roster()?
        .into_iter()
        .map(|role| Agent::new(role.name(), config.instructions_for(role), service.clone()))
        .collect();
    Ok(agents)
}
