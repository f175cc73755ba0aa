use crate::config::ConfigKey;
use clap::Parser;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

const AFTER_HELP: &str = "EXAMPLE
    issue-backup --owner USER --repo REPO --token ACCESS_TOKEN > issues.json

To create a personal access token on GitHub visit https://github.com/settings/tokens

If the environment variable ISSUE_BACKUP_GITHUB_TOKEN is set, the access token
will be read from there.";

/// Command line arguments
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(name = "issue-backup")]
#[command(version)]
#[command(about = "Stores a backup of the GitHub issues of a repository in JSON format")]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// Owner name (GitHub user or organization)
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long)]
    pub repo: Option<String>,

    /// GitHub OAuth personal access token
    #[arg(long)]
    pub token: Option<String>,

    /// Suppress non-error messages
    #[arg(short, long)]
    pub quiet: bool,

    /// JSON config file [default: .issue-backup/config.json]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// GitHub API base URL
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Issues to back up: open, closed or all
    #[arg(long)]
    pub state: Option<String>,
}

impl Cli {
    /// Values given on the command line, as config overrides.
    pub fn config_overrides(&self) -> HashMap<ConfigKey, Value> {
        [
            (ConfigKey::Owner, &self.owner),
            (ConfigKey::Repo, &self.repo),
            (ConfigKey::ApiUrl, &self.api_url),
            (ConfigKey::State, &self.state),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|v| (key, Value::String(v))))
        .collect()
    }
}
