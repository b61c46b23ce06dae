//! Configuration management
//!
//! Everything a session needs that is not code: which endpoint and model to
//! talk to, which agents take part, and how a turn is judged finished.
//! All configuration types are exported from this module.

pub mod store;

pub use store::{default_config_path, CREDENTIAL_ENV_DEFAULT};

use crate::agent::AgentRole;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_BASE_URL: &str = "https://models.inference.ai.azure.com";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_SENTINEL: &str = "done";
pub const DEFAULT_MAX_ITERATIONS: usize = 10;
pub const DEFAULT_SERVER_PORT: u16 = 41902;
pub const DEFAULT_WELCOME: &str =
    "welcome to the health agent, Which country/ city will you like to visit?";

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Completion endpoint settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Group chat settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// How a turn is judged finished
    #[serde(default)]
    pub termination: TerminationConfig,

    /// Per-agent overrides
    #[serde(default)]
    pub agents: AgentsConfig,

    /// WebSocket relay settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// OpenAI-compatible endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API endpoint base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Maximum tokens in a response
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 - 2.0)
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            max_tokens: None,
            temperature: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Group chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Participating agents, in turn order
    #[serde(default = "default_roster")]
    pub agents: Vec<String>,
    /// Number of trailing history messages sent to the model (None = all)
    #[serde(default)]
    pub history_window: Option<usize>,
    /// Upper bound on agent turns per user message
    #[serde(default = "default_max_iterations")]
    pub maximum_iterations: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            agents: default_roster(),
            history_window: None,
            maximum_iterations: default_max_iterations(),
        }
    }
}

/// Which termination strategy ends a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminationMode {
    /// Ask the model and look for the sentinel word
    #[default]
    Prompt,
    /// End once every agent has spoken once since the last user message
    Rounds,
}

impl std::fmt::Display for TerminationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationMode::Prompt => write!(f, "prompt"),
            TerminationMode::Rounds => write!(f, "rounds"),
        }
    }
}

/// Termination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminationConfig {
    #[serde(default)]
    pub mode: TerminationMode,
    /// Word whose presence in the model's verdict ends the turn
    #[serde(default = "default_sentinel")]
    pub sentinel: String,
    /// Replacement for the built-in termination prompt; `{{$lastmessage}}`
    /// is substituted with the latest message
    #[serde(default)]
    pub prompt: Option<String>,
    /// Agents whose turns trigger a check (None = last agent in the roster)
    #[serde(default)]
    pub agents: Option<Vec<String>>,
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            mode: TerminationMode::default(),
            sentinel: default_sentinel(),
            prompt: None,
            agents: None,
        }
    }
}

/// Per-agent instruction overrides keyed by agent name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentsConfig {
    #[serde(default)]
    pub instructions: HashMap<String, String>,
}

/// Relay server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// First message sent on every new connection
    #[serde(default = "default_welcome")]
    pub welcome: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            welcome: default_welcome(),
        }
    }
}

impl Config {
    /// Resolve the participating roles in turn order.
    pub fn roster(&self) -> Result<Vec<AgentRole>, ConfigError> {
        if self.chat.agents.is_empty() {
            return Err(ConfigError::Invalid {
                message: "chat.agents must name at least one agent".to_string(),
            });
        }
        let mut roles = Vec::with_capacity(self.chat.agents.len());
        for name in &self.chat.agents {
            let role = parse_role(name)?;
            if roles.contains(&role) {
                return Err(ConfigError::Invalid {
                    message: format!("agent {} appears twice in chat.agents", role.name()),
                });
            }
            roles.push(role);
        }
        Ok(roles)
    }

    /// Roles whose turns trigger a termination check. Every watched role must
    /// be on the roster.
    pub fn termination_roles(&self, roster: &[AgentRole]) -> Result<Vec<AgentRole>, ConfigError> {
        let Some(names) = &self.termination.agents else {
            return Ok(roster.last().copied().into_iter().collect());
        };
        let mut roles = Vec::with_capacity(names.len());
        for name in names {
            let role = parse_role(name)?;
            if !roster.contains(&role) {
                return Err(ConfigError::Invalid {
                    message: format!("termination.agents names {} which is not in chat.agents", role.name()),
                });
            }
            roles.push(role);
        }
        Ok(roles)
    }

    /// Instructions for a role, honoring config overrides.
    pub fn instructions_for(&self, role: AgentRole) -> String {
        self.agents
            .instructions
            .get(role.name())
            .cloned()
            .unwrap_or_else(|| role.instructions().to_string())
    }

    /// Sanity checks that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chat.maximum_iterations == 0 {
            return Err(ConfigError::Invalid {
                message: "chat.maximum_iterations must be at least 1".to_string(),
            });
        }
        if self.termination.sentinel.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "termination.sentinel must not be empty".to_string(),
            });
        }
        if let Some(t) = self.provider.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::Invalid {
                    message: format!("provider.temperature {} is outside 0.0 - 2.0", t),
                });
            }
        }
        for name in self.agents.instructions.keys() {
            parse_role(name)?;
        }
        let roster = self.roster()?;
        self.termination_roles(&roster)?;
        Ok(())
    }
}

fn parse_role(name: &str) -> Result<AgentRole, ConfigError> {
    name.parse::<AgentRole>().map_err(|_| ConfigError::UnknownAgent {
        name: name.to_string(),
    })
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    CREDENTIAL_ENV_DEFAULT.to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_roster() -> Vec<String> {
    AgentRole::ALL.iter().map(|r| r.name().to_string()).collect()
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_sentinel() -> String {
    DEFAULT_SENTINEL.to_string()
}

fn default_server_port() -> u16 {
    DEFAULT_SERVER_PORT
}

fn default_welcome() -> String {
    DEFAULT_WELCOME.to_string()
}
