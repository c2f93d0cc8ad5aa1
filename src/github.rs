//! GitHub OAuth and issue publishing.
//!
//! [`GithubClient`] talks to two GitHub surfaces:
//!
//! - the OAuth token endpoint, to trade an authorization code for an access
//!   token (used by the relay server), and
//! - the REST API, to look up the signed-in user and to file prototype
//!   feedback as issues and issue comments.
//!
//! No call is retried. Callers log failures and move on.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::comments::{Comment, Reply};
use crate::config::GithubConfig;

const USER_AGENT: &str = concat!("playbook/", env!("CARGO_PKG_VERSION"));
const REST_ACCEPT: &str = "application/vnd.github.v3+json";

/// Scopes requested when sending the user to GitHub's authorize page.
pub const OAUTH_SCOPE: &str = "repo user:email";

pub const ISSUE_LABELS: &[&str] = &["prototype-feedback", "playbook-comment"];

/// The signed-in GitHub user, as stored in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubUser {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Token endpoint reply. GitHub answers 200 even when the code is rejected,
/// reporting the problem in `error`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenExchange {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Result of a complete sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated {
        access_token: String,
        user: GithubUser,
    },
    /// GitHub refused the code; carries its description.
    Rejected(String),
}

/// Owner and name of the repository feedback is filed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

pub struct GithubClient {
    http: reqwest::Client,
    oauth_url: String,
    api_url: String,
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            oauth_url: config.oauth_url.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> Result<TokenExchange> {
        let body = serde_json::json!({
            "client_id": client_id,
            "client_secret": client_secret,
            "code": code,
        });
        let response = self
            .http
            .post(&self.oauth_url)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .context("token exchange request failed")?;
        let exchange: TokenExchange = response
            .json()
            .await
            .context("token endpoint returned an unreadable body")?;
        Ok(exchange)
    }

    pub async fn fetch_user(&self, token: &str) -> Result<GithubUser> {
        let response = self
            .http
            .get(format!("{}/user", self.api_url))
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("user lookup request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("GitHub user lookup failed {}: {}", status, body_text);
        }
        Ok(response.json().await?)
    }

    /// Exchange `code` and look up who it belongs to.
    pub async fn authenticate(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> Result<AuthOutcome> {
        let exchange = self.exchange_code(client_id, client_secret, code).await?;
        if let Some(error) = exchange.error {
            let description = exchange.error_description.unwrap_or(error);
            return Ok(AuthOutcome::Rejected(description));
        }
        let Some(access_token) = exchange.access_token.filter(|t| !t.is_empty()) else {
            bail!("token endpoint returned neither a token nor an error");
        };
        let user = self.fetch_user(&access_token).await?;
        Ok(AuthOutcome::Authenticated { access_token, user })
    }

    /// File a comment as an issue. Returns the new issue number.
    pub async fn create_issue(&self, token: &str, repo: &RepoRef, comment: &Comment) -> Result<u64> {
        let body = serde_json::json!({
            "title": issue_title(&comment.text),
            "body": issue_body(comment),
            "labels": ISSUE_LABELS,
        });
        let response = self
            .http
            .post(format!("{}/repos/{}/{}/issues", self.api_url, repo.owner, repo.repo))
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", REST_ACCEPT)
            .json(&body)
            .send()
            .await
            .context("issue request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Failed to create GitHub issue {}: {}", status, body_text);
        }
        let issue: serde_json::Value = response.json().await?;
        issue
            .get("number")
            .and_then(|n| n.as_u64())
            .ok_or_else(|| anyhow::anyhow!("GitHub issue response has no number"))
    }

    /// Post a reply as a comment on an existing issue.
    pub async fn add_issue_comment(
        &self,
        token: &str,
        repo: &RepoRef,
        issue_number: u64,
        reply: &Reply,
    ) -> Result<()> {
        let body = serde_json::json!({ "body": reply_body(reply) });
        let response = self
            .http
            .post(format!(
                "{}/repos/{}/{}/issues/{}/comments",
                self.api_url, repo.owner, repo.repo, issue_number
            ))
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", REST_ACCEPT)
            .json(&body)
            .send()
            .await
            .context("issue comment request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Failed to add GitHub reply {}: {}", status, body_text);
        }
        Ok(())
    }
}

/// The authorize page a user visits to start sign-in.
pub fn authorize_url(client_id: &str, redirect_uri: &str) -> String {
    format!(
        "https://github.com/login/oauth/authorize?client_id={}&redirect_uri={}&scope={}",
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(OAUTH_SCOPE)
    )
}

pub fn issue_title(text: &str) -> String {
    let head: String = text.chars().take(50).collect();
    format!("[Prototype Feedback] {}...", head)
}

fn format_time(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn issue_body(comment: &Comment) -> String {
    let mut page = format!("`{}`", comment.page_url);
    if let Some(context) = &comment.page_context {
        page.push_str(&format!(" ({})", context));
    }
    format!(
        "## 💬 Comment from Playbook Prototype\n\n\
         **Page:** {}\n\
         **Author:** @{}\n\
         **Timestamp:** {}\n\
         **Location (X, Y):** ({}, {})\n\n\
         ---\n\n\
         ### Comment Content:\n\
         > {}\n\n\
         ---\n\
         *This issue was automatically created from a comment in the Playbook prototype.*\n",
        page,
        comment.author,
        format_time(&comment.timestamp),
        comment.x,
        comment.y,
        comment.text
    )
}

pub fn reply_body(reply: &Reply) -> String {
    format!(
        "**Reply by @{}:**\n\n> {}\n\n---\n*Posted via Playbook prototype at {}*\n",
        reply.author,
        reply.text,
        format_time(&reply.timestamp)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn comment(text: &str) -> Comment {
        Comment {
            id: "c1".to_string(),
            x: 120.0,
            y: 48.5,
            text: text.to_string(),
            author: "octocat".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 20, 9, 30, 0).unwrap(),
            replies: Vec::new(),
            page_url: "/wizard".to_string(),
            page_context: Some("Select data".to_string()),
            issue_number: None,
        }
    }

    #[test]
    fn test_issue_title_truncates_to_50_chars() {
        let long = "x".repeat(80);
        let title = issue_title(&long);
        assert_eq!(title, format!("[Prototype Feedback] {}...", "x".repeat(50)));
        assert_eq!(issue_title("short"), "[Prototype Feedback] short...");
    }

    #[test]
    fn test_issue_title_respects_char_boundaries() {
        let title = issue_title(&"é".repeat(60));
        assert!(title.ends_with("..."));
        assert_eq!(title.chars().filter(|c| *c == 'é').count(), 50);
    }

    #[test]
    fn test_issue_body_fields() {
        let body = issue_body(&comment("Button label is confusing"));
        assert!(body.contains("**Page:** `/wizard` (Select data)"));
        assert!(body.contains("**Author:** @octocat"));
        assert!(body.contains("**Timestamp:** 2024-05-20 09:30:00 UTC"));
        assert!(body.contains("**Location (X, Y):** (120, 48.5)"));
        assert!(body.contains("> Button label is confusing"));
    }

    #[test]
    fn test_reply_body() {
        let reply = Reply {
            id: "r1".to_string(),
            text: "Agreed".to_string(),
            author: "hubot".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 21, 0, 0, 0).unwrap(),
        };
        let body = reply_body(&reply);
        assert!(body.starts_with("**Reply by @hubot:**\n\n> Agreed"));
    }

    #[test]
    fn test_authorize_url_encodes_params() {
        let url = authorize_url("abc123", "http://localhost:5173");
        assert_eq!(
            url,
            "https://github.com/login/oauth/authorize?client_id=abc123&redirect_uri=http%3A%2F%2Flocalhost%3A5173&scope=repo%20user%3Aemail"
        );
        let url = authorize_url("a b", "http://x/cb?next=1&ü");
        assert!(url.contains("client_id=a%20b&"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Fx%2Fcb%3Fnext%3D1%26%C3%BC&"));
    }
}
