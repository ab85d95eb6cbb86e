//! Domain DTOs for the posts resource.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Wire names are camelCase (`userId`) to match the JSONPlaceholder shape.
//! Integration tests catch any schema drift between the two crates.
//!
//! `PostDraft` is the only thing the edit form produces. It never carries an
//! `id` or `userId`; those are merged in by the controller from the session
//! target or from configuration.

use serde::{Deserialize, Serialize};

/// Identifier assigned to a post by the remote resource.
pub type PostId = u64;

/// Author identifier. Not user-editable.
pub type UserId = u64;

/// A single post record as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub user_id: UserId,
}

impl Post {
    /// Return a copy of this post with the draft's title and body applied.
    /// `id` and `user_id` are carried over unchanged.
    pub fn merged(&self, draft: &PostDraft) -> Post {
        Post {
            id: self.id,
            title: draft.title.clone(),
            body: draft.body.clone(),
            user_id: self.user_id,
        }
    }
}

/// The editable subset of a post, as submitted by the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

impl From<&Post> for PostDraft {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            body: post.body.clone(),
        }
    }
}

/// Request payload for creating a post. The server assigns the `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub user_id: UserId,
}

impl NewPost {
    pub fn from_draft(draft: &PostDraft, user_id: UserId) -> Self {
        Self {
            title: draft.title.clone(),
            body: draft.body.clone(),
            user_id,
        }
    }
}
