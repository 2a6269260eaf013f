// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Handlers talk to the stores through the traits below so that the same
//! routes run against Firestore in production and in-memory maps in tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::Result;
use crate::models::{
    Activity, ActivityFilter, Comment, NewActivity, NewComment, NewUser, User,
};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const ACTIVITIES: &str = "activities";
    /// Follow edges keyed by `{follower}_{followed}`
    pub const FOLLOWS: &str = "follows";
    /// Like edges keyed by `{user}_{activity}`
    pub const LIKES: &str = "likes";
    pub const COMMENTS: &str = "comments";
}

/// User profiles.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user. Fails with `Conflict` when the pseudo or email is taken.
    async fn create_user(&self, new_user: NewUser) -> Result<User>;

    async fn get_user(&self, user_id: u64) -> Result<Option<User>>;

    /// Fetch several users at once. Unknown IDs are skipped.
    async fn get_users(&self, user_ids: &[u64]) -> Result<Vec<User>>;

    async fn find_user_by_pseudo(&self, pseudo: &str) -> Result<Option<User>>;

    /// Users whose pseudo starts with `prefix`, ordered by pseudo.
    async fn search_users(&self, prefix: &str, limit: usize) -> Result<Vec<User>>;

    /// Delete a user and everything they own or authored: activities (with
    /// their likes and comments), follow edges in both directions, likes and
    /// comments left on other activities.
    ///
    /// Returns the number of records deleted.
    async fn delete_user_data(&self, user_id: u64) -> Result<usize>;
}

/// Activity records.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn create_activity(&self, new_activity: NewActivity) -> Result<Activity>;

    async fn get_activity(&self, activity_id: u64) -> Result<Option<Activity>>;

    /// A user's activities matching `filter`, newest first.
    async fn list_activities(&self, user_id: u64, filter: &ActivityFilter)
        -> Result<Vec<Activity>>;

    /// Activities of any of `user_ids` dated on or after `since`, in no
    /// particular order.
    async fn list_activities_for_users(
        &self,
        user_ids: &[u64],
        since: NaiveDate,
    ) -> Result<Vec<Activity>>;

    /// Overwrite a stored activity.
    async fn update_activity(&self, activity: &Activity) -> Result<()>;

    /// Delete an activity together with its likes and comments.
    async fn delete_activity(&self, activity_id: u64) -> Result<()>;
}

/// Follow, like and comment records.
///
/// Follow and like operations are idempotent and report whether anything
/// changed.
#[async_trait]
pub trait SocialGraphStore: Send + Sync {
    async fn follow(&self, follower_id: u64, followed_id: u64) -> Result<bool>;

    async fn unfollow(&self, follower_id: u64, followed_id: u64) -> Result<bool>;

    /// Users followed by `user_id`.
    async fn following_ids(&self, user_id: u64) -> Result<Vec<u64>>;

    /// Users following `user_id`.
    async fn follower_ids(&self, user_id: u64) -> Result<Vec<u64>>;

    async fn like(&self, user_id: u64, activity_id: u64) -> Result<bool>;

    async fn unlike(&self, user_id: u64, activity_id: u64) -> Result<bool>;

    async fn like_count(&self, activity_id: u64) -> Result<u64>;

    async fn has_liked(&self, user_id: u64, activity_id: u64) -> Result<bool>;

    /// Users who liked an activity.
    async fn liker_ids(&self, activity_id: u64) -> Result<Vec<u64>>;

    async fn add_comment(&self, new_comment: NewComment) -> Result<Comment>;

    async fn get_comment(&self, comment_id: u64) -> Result<Option<Comment>>;

    /// Overwrite a stored comment.
    async fn update_comment(&self, comment: &Comment) -> Result<()>;

    async fn delete_comment(&self, comment_id: u64) -> Result<()>;

    /// Comments on an activity, oldest first.
    async fn list_comments(&self, activity_id: u64, limit: usize) -> Result<Vec<Comment>>;

    async fn comment_count(&self, activity_id: u64) -> Result<u64>;
}

/// Everything the HTTP layer needs from storage.
pub trait Database: UserStore + ActivityStore + SocialGraphStore {}

impl<T> Database for T where T: UserStore + ActivityStore + SocialGraphStore {}
