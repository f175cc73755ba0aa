use crate::github::client::DEFAULT_API_URL;
use crate::github::issues::IssueState;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration keys enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    Owner,
    Repo,
    ApiUrl,
    State,
}

impl ConfigKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::Owner => "owner",
            ConfigKey::Repo => "repo",
            ConfigKey::ApiUrl => "api_url",
            ConfigKey::State => "state",
        }
    }

    /// Get all config keys
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::Owner,
            ConfigKey::Repo,
            ConfigKey::ApiUrl,
            ConfigKey::State,
        ]
    }
}

/// Filename for the project-specific configuration within the config directory.
pub const PROJECT_CONFIG_FILENAME: &str = "config.json";
/// Directory name for project-specific configuration.
pub const PROJECT_CONFIG_DIR: &str = ".issue-backup";
/// Environment variable that overrides the access token flag.
pub const TOKEN_ENV_VAR: &str = "ISSUE_BACKUP_GITHUB_TOKEN";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("owner name not specified; see --owner flag")]
    MissingOwner,

    #[error("repository name not specified; see --repo flag")]
    MissingRepo,

    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Parses a JSON configuration file content into a map of configuration values.
///
/// - Returns an empty map if `content` is empty or only whitespace.
/// - Unknown keys are skipped.
/// - Returns an `Err` if the content is not valid JSON or not a JSON object.
pub fn parse_config(content: &[u8]) -> Result<HashMap<ConfigKey, Value>> {
    if content.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(HashMap::new());
    }

    let value: Value = serde_json::from_slice(content).context("Failed to parse config JSON")?;

    let mut config_map = HashMap::new();

    if let Value::Object(map) = &value {
        for key in ConfigKey::all() {
            if let Some(val) = map.get(key.as_str()) {
                config_map.insert(*key, val.clone());
            }
        }
        return Ok(config_map);
    }

    Err(anyhow::anyhow!("Config must be a JSON object"))
}

/// Merges `updates` into `base_config` and returns a new configuration map.
///
/// If a key exists in both, the value from `updates` wins.
pub fn update_config(
    base_config: &HashMap<ConfigKey, Value>,
    updates: &HashMap<ConfigKey, Value>,
) -> HashMap<ConfigKey, Value> {
    let mut new_config = base_config.clone();
    for (key, value) in updates {
        new_config.insert(*key, value.clone());
    }
    new_config
}

/// Default location of the project config file, relative to the working directory.
pub fn default_config_path() -> PathBuf {
    Path::new(PROJECT_CONFIG_DIR).join(PROJECT_CONFIG_FILENAME)
}

/// Loads the config file at `path`.
///
/// A missing file yields an empty map unless `required` is set.
pub fn load_config_file(path: &Path, required: bool) -> Result<HashMap<ConfigKey, Value>> {
    if !required && !path.exists() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid config file {}", path.display()))
}

/// Picks the access token: the environment variable wins over the flag.
pub fn resolve_token(flag_token: Option<String>, env_token: Option<String>) -> Option<String> {
    if let Some(token) = env_token {
        tracing::info!("using OAuth token from {TOKEN_ENV_VAR} environment variable");
        return Some(token);
    }
    flag_token
}

/// Fully resolved settings of one backup run.
#[derive(Clone, PartialEq)]
pub struct BackupConfig {
    pub owner: String,
    pub repo: String,
    pub token: Option<String>,
    pub api_url: String,
    pub state: IssueState,
}

impl std::fmt::Debug for BackupConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("api_url", &self.api_url)
            .field("state", &self.state)
            .finish()
    }
}

impl BackupConfig {
    /// Builds the settings from a merged configuration map and a token.
    pub fn resolve(
        config: &HashMap<ConfigKey, Value>,
        token: Option<String>,
    ) -> Result<Self, ConfigError> {
        let owner = string_value(config, ConfigKey::Owner)?.ok_or(ConfigError::MissingOwner)?;
        let repo = string_value(config, ConfigKey::Repo)?.ok_or(ConfigError::MissingRepo)?;
        let api_url = string_value(config, ConfigKey::ApiUrl)?
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let state = match string_value(config, ConfigKey::State)? {
            Some(state) => state.parse::<IssueState>().map_err(|reason| ConfigError::InvalidValue {
                key: ConfigKey::State.as_str(),
                reason,
            })?,
            None => IssueState::default(),
        };

        let token = token.filter(|t| !t.is_empty());
        if token.is_none() {
            tracing::warn!(
                "OAuth token not specified; use --token flag or set {TOKEN_ENV_VAR} environment variable"
            );
        }

        Ok(BackupConfig {
            owner,
            repo,
            token,
            api_url,
            state,
        })
    }
}

/// Reads a non-empty string value; empty strings count as unset.
fn string_value(
    config: &HashMap<ConfigKey, Value>,
    key: ConfigKey,
) -> Result<Option<String>, ConfigError> {
    match config.get(&key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ConfigError::InvalidValue {
            key: key.as_str(),
            reason: format!("expected a string, got {other}"),
        }),
    }
}
