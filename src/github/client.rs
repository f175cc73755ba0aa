//! Authenticated access to the GitHub REST API.

use crate::github::comments::Comment;
use crate::github::error::FetchError;
use crate::github::issues::{Issue, IssueState};
use crate::github::pagination::{Page, next_page_from_link};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

/// Default GitHub REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = "issue-backup";

/// The two paginated listings a backup needs.
#[async_trait]
pub trait IssueTracker {
    /// Lists one page of the issues of `owner/repo`.
    async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Issue>, FetchError>;

    /// Lists one page of the comments of issue `issue_number` of `owner/repo`.
    async fn list_comments(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Comment>, FetchError>;
}

/// GitHub client authenticated with an optional personal access token.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    state: IssueState,
}

impl GitHubClient {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        state: IssueState,
    ) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(GitHubClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            state,
        })
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Page<T>, FetchError> {
        let mut request = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();

        if !status.is_success() {
            if let Some(reset_at) = rate_limit_reset(status, &headers, Utc::now()) {
                return Err(FetchError::RateLimited { reset_at });
            }
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: error_message(&body, status),
            });
        }

        let next_page = headers
            .get("link")
            .and_then(|v| v.to_str().ok())
            .and_then(next_page_from_link);
        let body = response.bytes().await?;
        let items: Vec<T> = serde_json::from_slice(&body)?;

        Ok(Page { items, next_page })
    }
}

#[async_trait]
impl IssueTracker for GitHubClient {
    async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Issue>, FetchError> {
        let path = format!("/repos/{owner}/{repo}/issues");
        let query = [
            ("state", self.state.as_str().to_string()),
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ];
        self.get_page(&path, &query).await
    }

    async fn list_comments(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Comment>, FetchError> {
        let path = format!("/repos/{owner}/{repo}/issues/{issue_number}/comments");
        let query = [
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ];
        self.get_page(&path, &query).await
    }
}

/// Returns the reset time if the response signals an exhausted rate limit.
///
/// Primary limits carry `x-ratelimit-remaining: 0` and the reset epoch in
/// `x-ratelimit-reset`; secondary limits carry `retry-after` in seconds.
fn rate_limit_reset(
    status: StatusCode,
    headers: &HeaderMap,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }

    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    if let Some(seconds) = header("retry-after").and_then(|v| v.trim().parse::<i64>().ok()) {
        return Some(now + chrono::Duration::seconds(seconds));
    }

    if header("x-ratelimit-remaining").map(str::trim) == Some("0") {
        let reset_at = header("x-ratelimit-reset")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .and_then(|epoch| DateTime::from_timestamp(epoch, 0))
            .unwrap_or(now);
        return Some(reset_at);
    }

    None
}

fn error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| status.to_string())
}
