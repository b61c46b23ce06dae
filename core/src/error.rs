//! Structured error types for the travel-health assistant
//!
//! `ConfigError` covers everything that can go wrong before a session starts.
//! `AgentError` covers failures while agents are talking to the completion
//! service. Both carry enough detail for the driver to print a useful line.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or resolving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required credential variable is not set
    #[error("missing credential: environment variable {var} is not set")]
    MissingCredential { var: String },

    /// Explicit config path does not exist
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for our schema
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Roster or termination settings name an agent we don't know
    #[error("unknown agent: {name}")]
    UnknownAgent { name: String },

    /// Other invalid settings
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

/// Errors raised by agents, the completion service and the group chat
#[derive(Error, Debug)]
pub enum AgentError {
    // =========================================================================
    // Provider / API Errors
    // =========================================================================
    /// Authentication/authorization errors
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Rate limit exceeded (429)
    #[error("rate limit exceeded: {message}")]
    RateLimitExceeded { message: String },

    /// Provider returned an error
    #[error("provider error: {status} - {message}")]
    ProviderError { status: u16, message: String },

    /// Provider answered with a body we could not decode
    #[error("invalid response from provider: {message}")]
    InvalidResponse { message: String },

    // =========================================================================
    // Network Errors
    // =========================================================================
    /// Network/connection error
    #[error("connection failed: {message}")]
    ConnectionFailed { message: String },

    /// Request did not complete in time
    #[error("request timed out after {duration:?}")]
    Timeout { duration: Duration },

    // =========================================================================
    // Group chat Errors
    // =========================================================================
    /// Group chat has no agents to select from
    #[error("group chat has no agents")]
    EmptyRoster,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AgentError {
    /// Whether the failure is likely to go away on its own.
    ///
    /// Only used to pick a log level; nothing retries.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout { .. } | Self::RateLimitExceeded { .. } => true,
            Self::ProviderError { status, .. } => matches!(status, 500 | 502 | 503 | 504),
            Self::Unauthorized { .. }
            | Self::InvalidResponse { .. }
            | Self::EmptyRoster
            | Self::Config(_) => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized { .. } => {
                "Authentication failed. Please check your API key.".to_string()
            }
            Self::RateLimitExceeded { .. } => {
                "Rate limit exceeded. Please try again later.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse {
                message: err.to_string(),
            }
        } else {
            Self::ConnectionFailed {
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse {
            message: err.to_string(),
        }
    }
}

/// Result type alias using AgentError
pub type Result<T> = std::result::Result<T, AgentError>;
