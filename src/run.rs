use crate::backup::{self, BackupSummary};
use crate::cli::parser::Cli;
use crate::config::{self, BackupConfig};
use crate::github::client::GitHubClient;
use anyhow::Context;
use std::io::Write;

/// Resolves the configuration for `cli` and backs up the repository to `out`.
pub async fn run(cli: Cli, out: &mut dyn Write) -> anyhow::Result<BackupSummary> {
    let file_config = match &cli.config {
        Some(path) => config::load_config_file(path, true)?,
        None => config::load_config_file(&config::default_config_path(), false)?,
    };
    let merged = config::update_config(&file_config, &cli.config_overrides());
    let token = config::resolve_token(cli.token, std::env::var(config::TOKEN_ENV_VAR).ok());
    let config = BackupConfig::resolve(&merged, token)?;

    let client = GitHubClient::new(&config.api_url, config.token.clone(), config.state)
        .context("Failed to create HTTP client")?;

    let summary = backup::backup_issues(&client, &config.owner, &config.repo, out)
        .await
        .with_context(|| format!("Failed to back up {}/{}", config.owner, config.repo))?;

    tracing::info!(
        issues = summary.issues,
        comments = summary.comments,
        incomplete = summary.incomplete_collections,
        "backup of {}/{} complete",
        config.owner,
        config.repo
    );
    Ok(summary)
}
