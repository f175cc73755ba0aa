use crate::github::client::IssueTracker;
use crate::github::pagination::{Collected, FetchScope, Resource, fetch_all_pages};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// A GitHub issue, kept as the raw API payload.
///
/// Only `number` and `comments` are read; every other field is written back
/// out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Issue(Value);

impl Issue {
    pub fn new(payload: Value) -> Self {
        Issue(payload)
    }

    pub fn number(&self) -> u64 {
        self.0["number"].as_u64().unwrap_or_default()
    }

    pub fn comment_count(&self) -> u64 {
        self.0["comments"].as_u64().unwrap_or_default()
    }
}

/// Issue state filter of the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IssueState {
    Open,
    Closed,
    #[default]
    All,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
            IssueState::All => "all",
        }
    }
}

impl FromStr for IssueState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(IssueState::Open),
            "closed" => Ok(IssueState::Closed),
            "all" => Ok(IssueState::All),
            other => Err(format!(
                "invalid issue state '{other}'; expected open, closed or all"
            )),
        }
    }
}

/// Fetches all issues of `owner/repo`, in API order.
pub async fn fetch_issues<C>(client: &C, owner: &str, repo: &str) -> Collected<Issue>
where
    C: IssueTracker + ?Sized,
{
    let scope = FetchScope {
        owner,
        repo,
        resource: Resource::Issues,
    };
    fetch_all_pages(scope, |page, per_page| {
        client.list_issues(owner, repo, page, per_page)
    })
    .await
}
