// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Social graph records: follows, likes and comments.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Directed follow relation. Unique per pair, never a self-loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowEdge {
    pub follower_id: u64,
    pub followed_id: u64,
    pub created_at: String,
}

impl FollowEdge {
    /// Document ID derived from the pair so repeated follows hit the same record.
    pub fn doc_id(follower_id: u64, followed_id: u64) -> String {
        format!("{}_{}", follower_id, followed_id)
    }
}

/// A user's like on an activity. At most one per (user, activity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeEdge {
    pub user_id: u64,
    pub activity_id: u64,
    pub created_at: String,
}

impl LikeEdge {
    pub fn doc_id(user_id: u64, activity_id: u64) -> String {
        format!("{}_{}", user_id, activity_id)
    }
}

/// Comment on an activity, deleted together with the activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Comment {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub activity_id: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub author_id: u64,
    pub content: String,
    pub created_at: String,
}

/// Fields supplied when posting a comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub activity_id: u64,
    pub author_id: u64,
    pub content: String,
}

impl NewComment {
    pub fn into_comment(self, id: u64, created_at: String) -> Comment {
        Comment {
            id,
            activity_id: self.activity_id,
            author_id: self.author_id,
            content: self.content,
            created_at,
        }
    }
}

/// Normalize comment content, rejecting text that is blank once trimmed.
pub fn normalize_comment(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
