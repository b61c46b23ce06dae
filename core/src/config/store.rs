//! Configuration Store
//!
//! Loads the TOML config file, layers environment overrides on top and
//! resolves the API credential.

use super::Config;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Credential variable used when the config does not name another one
pub const CREDENTIAL_ENV_DEFAULT: &str = "GITHUB_TOKEN";

/// Overrides the configured base URL
pub const BASE_URL_ENV: &str = "TRAVEL_HEALTH_BASE_URL";

/// Overrides the configured model
pub const MODEL_ENV: &str = "TRAVEL_HEALTH_MODEL";

/// Get default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("travel-health").join("config.toml"))
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    /// Load from an explicit path, else the default location, else defaults.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "loading config");
            return Self::load(path);
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config");
                return Self::load(&path);
            }
        }

        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `TRAVEL_HEALTH_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.provider.base_url = url;
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.trim().is_empty()) {
            self.provider.model = model;
        }
    }

    /// Read the API credential from the process environment.
    pub fn credential(&self) -> Result<String, ConfigError> {
        self.credential_with(|key| std::env::var(key).ok())
    }

    /// Read the API credential through an arbitrary variable lookup.
    ///
    /// Unset and empty are both treated as missing.
    pub fn credential_with<F>(&self, lookup: F) -> Result<String, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = &self.provider.api_key_env;
        lookup(var)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingCredential { var: var.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TerminationMode;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[provider]
model = "gpt-4o-mini"

[chat]
agents = ["disease_intelligent", "vaccine_booker"]

[termination]
mode = "rounds"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.provider.base_url, super::super::DEFAULT_BASE_URL);
        assert_eq!(config.provider.api_key_env, CREDENTIAL_ENV_DEFAULT);
        assert_eq!(config.chat.agents.len(), 2);
        assert_eq!(config.chat.maximum_iterations, 10);
        assert_eq!(config.termination.mode, TerminationMode::Rounds);
        assert_eq!(config.termination.sentinel, "done");
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load_or_default(Some(&missing)),
            Err(ConfigError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[chat]\nagents = 3\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.server.port = 9000;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.server.port, 9000);
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[(BASE_URL_ENV, "http://localhost:8080/v1"), (MODEL_ENV, "")]);
        let mut config = Config::default();
        config.apply_env_with(|k| vars.get(k).cloned());
        assert_eq!(config.provider.base_url, "http://localhost:8080/v1");
        // Empty values do not override
        assert_eq!(config.provider.model, super::super::DEFAULT_MODEL);
    }

    #[test]
    fn test_credential_lookup() {
        let config = Config::default();

        let vars = env(&[("GITHUB_TOKEN", "ghp_secret")]);
        assert_eq!(config.credential_with(|k| vars.get(k).cloned()).unwrap(), "ghp_secret");

        let vars = env(&[]);
        assert!(matches!(
            config.credential_with(|k| vars.get(k).cloned()),
            Err(ConfigError::MissingCredential { var }) if var == "GITHUB_TOKEN"
        ));

        let vars = env(&[("GITHUB_TOKEN", "   ")]);
        assert!(config.credential_with(|k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn test_custom_credential_variable() {
        let mut config = Config::default();
        config.provider.api_key_env = "OPENAI_API_KEY".to_string();
        let vars = env(&[("GITHUB_TOKEN", "ghp_secret")]);
        assert!(matches!(
            config.credential_with(|k| vars.get(k).cloned()),
            Err(ConfigError::MissingCredential { var }) if var == "OPENAI_API_KEY"
        ));
    }
}
