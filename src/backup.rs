//! Sequences a full backup of one repository.

use crate::github::client::IssueTracker;
use crate::github::comments::fetch_issue_comments;
use crate::github::issues::fetch_issues;
use crate::output;
use anyhow::{Context, Result};
use std::io::Write;

/// Counts reported once a backup completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackupSummary {
    pub issues: usize,
    pub comments: usize,
    /// Collections whose fetch stopped before the last page.
    pub incomplete_collections: usize,
}

/// Writes every issue of `owner/repo`, each followed by its comments, to `out`.
///
/// Issues are written in the order the API returns them. Issues without
/// comments get no comment record. Fetch failures shorten the output but do
/// not fail the backup; write failures do.
pub async fn backup_issues<C, W>(
    client: &C,
    owner: &str,
    repo: &str,
    out: &mut W,
) -> Result<BackupSummary>
where
    C: IssueTracker + ?Sized,
    W: Write + ?Sized,
{
    anyhow::ensure!(!owner.is_empty(), "owner name not specified");
    anyhow::ensure!(!repo.is_empty(), "repository name not specified");

    let mut summary = BackupSummary::default();

    let issues = fetch_issues(client, owner, repo).await;
    if !issues.is_complete() {
        summary.incomplete_collections += 1;
    }

    for issue in &issues.items {
        let number = issue.number();
        tracing::info!("issue #{number}");
        output::write_record(out, issue)
            .with_context(|| format!("Failed to write issue #{number}"))?;
        summary.issues += 1;

        let comment_count = issue.comment_count();
        if comment_count == 0 {
            continue;
        }
        tracing::info!("{comment_count} comments of issue #{number}");
        let comments = fetch_issue_comments(client, owner, repo, number).await;
        if !comments.is_complete() {
            summary.incomplete_collections += 1;
        }
        output::write_record(out, &comments.items)
            .with_context(|| format!("Failed to write comments of issue #{number}"))?;
        summary.comments += comments.items.len();
    }

    out.flush().context("Failed to flush output")?;
    Ok(summary)
}
