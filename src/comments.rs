//! Prototype feedback comments.
//!
//! Reviewers pin comments to a position on a page. Each comment carries a
//! thread of replies and, once published, the number of the GitHub issue
//! it was filed as. The full list lives under `playbook-comments`; a slim
//! list of pin markers is kept alongside under `playbook-comment-markers`.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::github::GithubUser;
use crate::storage::{load_json, save_json, KeyValueStore, COMMENTS_KEY, MARKERS_KEY};

pub const ANONYMOUS_AUTHOR: &str = "Anonymous User";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: String,
    pub text: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub replies: Vec<Reply>,
    pub page_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_number: Option<u64>,
}

/// Where a comment pin is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub page_url: String,
}

/// Display name for the signed-in user: name, then login, then anonymous.
pub fn author_name(user: Option<&GithubUser>) -> String {
    user.and_then(|u| {
        u.name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| Some(u.login.clone()).filter(|l| !l.is_empty()))
    })
    .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string())
}

/// A new comment pinned at a page position.
pub struct NewComment {
    pub page_url: String,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub author: String,
    pub page_context: Option<String>,
}

/// Comment operations over a key/value store.
pub struct CommentBoard<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> CommentBoard<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn all(&self) -> Result<Vec<Comment>> {
        Ok(load_json(self.store, COMMENTS_KEY)?.unwrap_or_default())
    }

    pub fn for_page(&self, page_url: &str) -> Result<Vec<Comment>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|c| c.page_url == page_url)
            .collect())
    }

    pub fn get(&self, id: &str) -> Result<Option<Comment>> {
        Ok(self.all()?.into_iter().find(|c| c.id == id))
    }

    pub fn markers(&self) -> Result<Vec<Marker>> {
        Ok(load_json(self.store, MARKERS_KEY)?.unwrap_or_default())
    }

    pub fn add(&self, new: NewComment) -> Result<Comment> {
        let mut comments = self.all()?;
        let comment = Comment {
            id: uuid::Uuid::new_v4().to_string(),
            x: new.x,
            y: new.y,
            text: new.text,
            author: new.author,
            timestamp: Utc::now(),
            replies: Vec::new(),
            page_url: new.page_url,
            page_context: new.page_context,
            issue_number: None,
        };
        comments.push(comment.clone());
        self.save(&comments)?;
        Ok(comment)
    }

    pub fn set_text(&self, id: &str, text: &str) -> Result<Comment> {
        self.modify(id, |c| c.text = text.to_string())
    }

    pub fn reply(&self, id: &str, text: &str, author: &str) -> Result<Reply> {
        let reply = Reply {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.to_string(),
            author: author.to_string(),
            timestamp: Utc::now(),
        };
        let added = reply.clone();
        self.modify(id, move |c| c.replies.push(added))?;
        Ok(reply)
    }

    pub fn link_issue(&self, id: &str, issue_number: u64) -> Result<Comment> {
        self.modify(id, |c| c.issue_number = Some(issue_number))
    }

    /// Remove a comment. Returns false when no comment had that id.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut comments = self.all()?;
        let before = comments.len();
        comments.retain(|c| c.id != id);
        if comments.len() == before {
            return Ok(false);
        }
        self.save(&comments)?;
        Ok(true)
    }

    fn modify(&self, id: &str, f: impl FnOnce(&mut Comment)) -> Result<Comment> {
        let mut comments = self.all()?;
        let Some(comment) = comments.iter_mut().find(|c| c.id == id) else {
            bail!("No comment with id {}", id);
        };
        f(comment);
        let updated = comment.clone();
        self.save(&comments)?;
        Ok(updated)
    }

    fn save(&self, comments: &[Comment]) -> Result<()> {
        save_json(self.store, COMMENTS_KEY, &comments)?;
        let markers: Vec<Marker> = comments
            .iter()
            .map(|c| Marker {
                id: c.id.clone(),
                x: c.x,
                y: c.y,
                page_url: c.page_url.clone(),
            })
            .collect();
        save_json(self.store, MARKERS_KEY, &markers)
    }
}
