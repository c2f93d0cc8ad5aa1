//! `playbook comments` and `playbook github` commands.
//!
//! Comments are local until published. Publishing files a comment as a
//! GitHub issue on the configured repository and remembers the issue number;
//! replies to a published comment are mirrored as issue comments. GitHub
//! failures while mirroring are logged and the local change is kept.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::comments::{author_name, CommentBoard, NewComment};
use crate::config::Config;
use crate::github::{authorize_url, GithubClient, GithubUser, RepoRef};
use crate::storage::{
    load_json, save_json, FileStore, KeyValueStore, GITHUB_CONFIG_KEY, GITHUB_TOKEN_KEY,
    GITHUB_USER_KEY,
};

/// Repository settings saved by `github configure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredGithubConfig {
    pub owner: String,
    pub repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

// ============ Session ============

pub fn session_user(store: &dyn KeyValueStore) -> Result<Option<GithubUser>> {
    load_json(store, GITHUB_USER_KEY)
}

pub fn store_session(store: &dyn KeyValueStore, token: &str, user: &GithubUser) -> Result<()> {
    save_json(store, GITHUB_TOKEN_KEY, &token)?;
    save_json(store, GITHUB_USER_KEY, user)
}

pub fn clear_session(store: &dyn KeyValueStore) -> Result<()> {
    store.remove(GITHUB_TOKEN_KEY)?;
    store.remove(GITHUB_USER_KEY)
}

/// The signed-in token, else the one saved with `github configure`.
pub fn resolve_token(store: &dyn KeyValueStore) -> Result<Option<String>> {
    if let Some(token) = load_json::<String>(store, GITHUB_TOKEN_KEY)? {
        return Ok(Some(token));
    }
    let stored: Option<StoredGithubConfig> = load_json(store, GITHUB_CONFIG_KEY)?;
    Ok(stored.and_then(|c| c.token))
}

/// Saved repository settings win over `[github]` in the config file.
pub fn resolve_repo(store: &dyn KeyValueStore, config: &Config) -> Result<RepoRef> {
    let stored: Option<StoredGithubConfig> = load_json(store, GITHUB_CONFIG_KEY)?;
    Ok(match stored {
        Some(c) => RepoRef {
            owner: c.owner,
            repo: c.repo,
        },
        None => RepoRef {
            owner: config.github.owner.clone(),
            repo: config.github.repo.clone(),
        },
    })
}

// ============ Publishing ============

/// File comment `id` as an issue and link it. Returns the issue number.
pub async fn publish_comment(
    store: &dyn KeyValueStore,
    client: &GithubClient,
    token: &str,
    repo: &RepoRef,
    id: &str,
) -> Result<u64> {
    let board = CommentBoard::new(store);
    let comment = board
        .get(id)?
        .with_context(|| format!("No comment with id {}", id))?;
    if let Some(existing) = comment.issue_number {
        bail!("Comment {} is already published as issue #{}", id, existing);
    }
    let number = client.create_issue(token, repo, &comment).await?;
    board.link_issue(id, number)?;
    Ok(number)
}

// ============ Commands ============

pub fn run_list(config: &Config, page: Option<&str>, json: bool) -> Result<()> {
    let store = FileStore::new(&config.storage.dir);
    let board = CommentBoard::new(&store);
    let comments = match page {
        Some(p) => board.for_page(p)?,
        None => board.all()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&comments)?);
        return Ok(());
    }
    if comments.is_empty() {
        println!("No comments.");
        return Ok(());
    }
    for (i, c) in comments.iter().enumerate() {
        println!("{}. [{}] {} @ ({}, {})", i + 1, c.id, c.page_url, c.x, c.y);
        println!("    author: {}", c.author);
        println!("    at: {}", c.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
        if let Some(n) = c.issue_number {
            println!("    issue: #{}", n);
        }
        println!("    {}", c.text);
        for r in &c.replies {
            println!("      ↳ {}: {}", r.author, r.text);
        }
        println!();
    }
    Ok(())
}

pub struct AddArgs {
    pub page: String,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub context: Option<String>,
}

pub fn run_add(config: &Config, args: AddArgs) -> Result<()> {
    let store = FileStore::new(&config.storage.dir);
    let author = author_name(session_user(&store)?.as_ref());
    let board = CommentBoard::new(&store);
    let comment = board.add(NewComment {
        page_url: args.page,
        x: args.x,
        y: args.y,
        text: args.text,
        author,
        page_context: args.context,
    })?;
    println!("Added comment {}", comment.id);
    Ok(())
}

pub fn run_edit(config: &Config, id: &str, text: &str) -> Result<()> {
    let store = FileStore::new(&config.storage.dir);
    CommentBoard::new(&store).set_text(id, text)?;
    println!("Updated comment {}", id);
    Ok(())
}

pub async fn run_reply(config: &Config, id: &str, text: &str) -> Result<()> {
    let store = FileStore::new(&config.storage.dir);
    let author = author_name(session_user(&store)?.as_ref());
    let board = CommentBoard::new(&store);
    let reply = board.reply(id, text, &author)?;
    println!("Added reply {}", reply.id);

    let issue_number = board.get(id)?.and_then(|c| c.issue_number);
    let (Some(issue_number), Some(token)) = (issue_number, resolve_token(&store)?) else {
        return Ok(());
    };
    let repo = resolve_repo(&store, config)?;
    let client = GithubClient::new(&config.github)?;
    match client
        .add_issue_comment(&token, &repo, issue_number, &reply)
        .await
    {
        Ok(()) => println!("Mirrored to issue #{}", issue_number),
        Err(e) => tracing::error!("Failed to add GitHub reply: {:#}", e),
    }
    Ok(())
}

pub fn run_delete(config: &Config, id: &str) -> Result<()> {
    let store = FileStore::new(&config.storage.dir);
    if !CommentBoard::new(&store).delete(id)? {
        bail!("No comment with id {}", id);
    }
    println!("Deleted comment {}", id);
    Ok(())
}

pub async fn run_publish(config: &Config, id: &str) -> Result<()> {
    let store = FileStore::new(&config.storage.dir);
    let Some(token) = resolve_token(&store)? else {
        bail!("Not signed in to GitHub. Run `playbook github login` or `playbook github configure --token`.");
    };
    let repo = resolve_repo(&store, config)?;
    let client = GithubClient::new(&config.github)?;
    let number = publish_comment(&store, &client, &token, &repo, id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create GitHub issue: {:#}", e);
            e
        })?;
    println!(
        "Published as https://github.com/{}/{}/issues/{}",
        repo.owner, repo.repo, number
    );
    Ok(())
}

#[derive(Deserialize)]
struct RelayReply {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<GithubUser>,
    #[serde(default)]
    error: Option<String>,
}

/// Trade `code` for a session through the relay server.
pub async fn login_via_relay(relay: &str, code: &str, timeout_secs: u64) -> Result<(String, GithubUser)> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    let url = format!("{}/api/github-auth", relay.trim_end_matches('/'));
    let response = client
        .post(&url)
        .json(&serde_json::json!({ "code": code }))
        .send()
        .await
        .with_context(|| format!("Failed to reach relay at {}", url))?;

    let status = response.status();
    let reply: RelayReply = response
        .json()
        .await
        .context("relay returned an unreadable body")?;
    if !status.is_success() {
        bail!(
            "Relay error {}: {}",
            status,
            reply.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    match (reply.access_token, reply.user) {
        (Some(token), Some(user)) => Ok((token, user)),
        _ => bail!("relay response is missing the token or user"),
    }
}

pub async fn run_login(
    config: &Config,
    code: Option<&str>,
    relay: Option<&str>,
    redirect_uri: &str,
) -> Result<()> {
    let Some(code) = code else {
        let Some(client_id) = config.github.resolve_client_id() else {
            bail!("No GitHub client id. Set [github].client_id or GITHUB_CLIENT_ID.");
        };
        println!("Open this URL to authorize, then rerun with --code:");
        println!("  {}", authorize_url(&client_id, redirect_uri));
        return Ok(());
    };

    let relay = relay
        .map(str::to_string)
        .unwrap_or_else(|| format!("http://{}", config.server.bind));
    let (token, user) = login_via_relay(&relay, code, config.github.timeout_secs).await?;

    let store = FileStore::new(&config.storage.dir);
    store_session(&store, &token, &user)?;
    println!("Signed in as {}", author_name(Some(&user)));
    Ok(())
}

pub fn run_configure(config: &Config, owner: &str, repo: &str, token: Option<&str>) -> Result<()> {
    if owner.is_empty() || repo.is_empty() {
        bail!("owner and repo must not be empty");
    }
    let store = FileStore::new(&config.storage.dir);
    let stored = StoredGithubConfig {
        owner: owner.to_string(),
        repo: repo.to_string(),
        token: token.map(str::to_string),
    };
    save_json(&store, GITHUB_CONFIG_KEY, &stored)?;
    println!("Feedback will be filed against {}/{}", owner, repo);
    Ok(())
}

pub fn run_logout(config: &Config) -> Result<()> {
    let store = FileStore::new(&config.storage.dir);
    clear_session(&store)?;
    println!("Signed out of GitHub");
    Ok(())
}

pub fn run_status(config: &Config) -> Result<()> {
    let store = FileStore::new(&config.storage.dir);
    match session_user(&store)? {
        Some(user) => println!("Signed in as {} (@{})", author_name(Some(&user)), user.login),
        None => println!("Not signed in"),
    }
    let repo = resolve_repo(&store, config)?;
    println!("    repository: {}/{}", repo.owner, repo.repo);
    println!(
        "    token: {}",
        if resolve_token(&store)?.is_some() {
            "available"
        } else {
            "none"
        }
    );
    Ok(())
}
