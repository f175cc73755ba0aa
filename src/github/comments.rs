use crate::github::client::IssueTracker;
use crate::github::pagination::{Collected, FetchScope, Resource, fetch_all_pages};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An issue comment, kept as the raw API payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Comment(Value);

impl Comment {
    pub fn new(payload: Value) -> Self {
        Comment(payload)
    }
}

/// Fetches all comments of issue `issue_number`, in API order.
pub async fn fetch_issue_comments<C>(
    client: &C,
    owner: &str,
    repo: &str,
    issue_number: u64,
) -> Collected<Comment>
where
    C: IssueTracker + ?Sized,
{
    let scope = FetchScope {
        owner,
        repo,
        resource: Resource::Comments { issue_number },
    };
    fetch_all_pages(scope, |page, per_page| {
        client.list_comments(owner, repo, issue_number, page, per_page)
    })
    .await
}
