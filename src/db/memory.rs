// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store for local development and tests.
//!
//! Edges are keyed by their `(a, b)` pair so repeated follows and likes land
//! on the same map entry.

use crate::db::{ActivityStore, SocialGraphStore, UserStore};
use crate::error::{AppError, Result};
use crate::models::{
    sort_newest_first, Activity, ActivityFilter, Comment, FollowEdge, LikeEdge, NewActivity,
    NewComment, NewUser, User,
};
use crate::time_utils::now_rfc3339;
use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct MemoryDb {
    next_id: AtomicU64,
    users: DashMap<u64, User>,
    /// pseudo -> user ID
    pseudos: DashMap<String, u64>,
    /// lowercased email -> user ID
    emails: DashMap<String, u64>,
    activities: DashMap<u64, Activity>,
    follows: DashMap<(u64, u64), FollowEdge>,
    likes: DashMap<(u64, u64), LikeEdge>,
    comments: DashMap<u64, Comment>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn purge_activity(&self, activity_id: u64) -> usize {
        let mut removed = usize::from(self.activities.remove(&activity_id).is_some());

        let before = self.likes.len();
        self.likes.retain(|(_, liked), _| *liked != activity_id);
        removed += before - self.likes.len();

        let before = self.comments.len();
        self.comments.retain(|_, c| c.activity_id != activity_id);
        removed += before - self.comments.len();

        removed
    }
}

#[async_trait]
impl UserStore for MemoryDb {
    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let id = self.allocate_id();
        let email_key = new_user.email.to_lowercase();

        // Reserve the pseudo first, then the email, releasing the pseudo if
        // the email turns out to be taken.
        match self.pseudos.entry(new_user.pseudo.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict(format!(
                    "Pseudo '{}' is already taken",
                    new_user.pseudo
                )))
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }
        match self.emails.entry(email_key) {
            Entry::Occupied(_) => {
                self.pseudos.remove(&new_user.pseudo);
                return Err(AppError::Conflict("Email is already registered".to_string()));
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let user = new_user.into_user(id, now_rfc3339());
        self.users.insert(id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: u64) -> Result<Option<User>> {
        Ok(self.users.get(&user_id).map(|u| u.clone()))
    }

    async fn get_users(&self, user_ids: &[u64]) -> Result<Vec<User>> {
        Ok(user_ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|u| u.clone()))
            .collect())
    }

    async fn find_user_by_pseudo(&self, pseudo: &str) -> Result<Option<User>> {
        let id = self.pseudos.get(pseudo).map(|id| *id);
        Ok(id.and_then(|id| self.users.get(&id).map(|u| u.clone())))
    }

    async fn search_users(&self, prefix: &str, limit: usize) -> Result<Vec<User>> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|u| u.pseudo.starts_with(prefix))
            .map(|u| u.clone())
            .collect();
        users.sort_by(|a, b| a.pseudo.cmp(&b.pseudo));
        users.truncate(limit);
        Ok(users)
    }

    async fn delete_user_data(&self, user_id: u64) -> Result<usize> {
        let mut deleted = 0;

        let owned: Vec<u64> = self
            .activities
            .iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.id)
            .collect();
        for activity_id in owned {
            deleted += self.purge_activity(activity_id);
        }

        let before = self.follows.len();
        self.follows
            .retain(|(follower, followed), _| *follower != user_id && *followed != user_id);
        deleted += before - self.follows.len();

        let before = self.likes.len();
        self.likes.retain(|(liker, _), _| *liker != user_id);
        deleted += before - self.likes.len();

        let before = self.comments.len();
        self.comments.retain(|_, c| c.author_id != user_id);
        deleted += before - self.comments.len();

        if let Some((_, user)) = self.users.remove(&user_id) {
            self.pseudos.remove(&user.pseudo);
            self.emails.remove(&user.email.to_lowercase());
            deleted += 1;
        }

        tracing::info!(user_id, deleted, "User data deletion complete");
        Ok(deleted)
    }
}

#[async_trait]
impl ActivityStore for MemoryDb {
    async fn create_activity(&self, new_activity: NewActivity) -> Result<Activity> {
        let activity = new_activity.into_activity(self.allocate_id(), now_rfc3339());
        self.activities.insert(activity.id, activity.clone());
        Ok(activity)
    }

    async fn get_activity(&self, activity_id: u64) -> Result<Option<Activity>> {
        Ok(self.activities.get(&activity_id).map(|a| a.clone()))
    }

    async fn list_activities(
        &self,
        user_id: u64,
        filter: &ActivityFilter,
    ) -> Result<Vec<Activity>> {
        let mut activities: Vec<Activity> = self
            .activities
            .iter()
            .filter(|a| a.user_id == user_id && filter.matches(a))
            .map(|a| a.clone())
            .collect();
        sort_newest_first(&mut activities);
        if let Some(limit) = filter.limit {
            activities.truncate(limit);
        }
        Ok(activities)
    }

    async fn list_activities_for_users(
        &self,
        user_ids: &[u64],
        since: NaiveDate,
    ) -> Result<Vec<Activity>> {
        let owners: HashSet<u64> = user_ids.iter().copied().collect();
        Ok(self
            .activities
            .iter()
            .filter(|a| owners.contains(&a.user_id) && a.date >= since)
            .map(|a| a.clone())
            .collect())
    }

    async fn update_activity(&self, activity: &Activity) -> Result<()> {
        self.activities.insert(activity.id, activity.clone());
        Ok(())
    }

    async fn delete_activity(&self, activity_id: u64) -> Result<()> {
        let removed = self.purge_activity(activity_id);
        tracing::debug!(activity_id, removed, "Deleted activity");
        Ok(())
    }
}

#[async_trait]
impl SocialGraphStore for MemoryDb {
    async fn follow(&self, follower_id: u64, followed_id: u64) -> Result<bool> {
        match self.follows.entry((follower_id, followed_id)) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(FollowEdge {
                    follower_id,
                    followed_id,
                    created_at: now_rfc3339(),
                });
                Ok(true)
            }
        }
    }

    async fn unfollow(&self, follower_id: u64, followed_id: u64) -> Result<bool> {
        Ok(self.follows.remove(&(follower_id, followed_id)).is_some())
    }

    async fn following_ids(&self, user_id: u64) -> Result<Vec<u64>> {
        Ok(self
            .follows
            .iter()
            .filter(|e| e.follower_id == user_id)
            .map(|e| e.followed_id)
            .collect())
    }

    async fn follower_ids(&self, user_id: u64) -> Result<Vec<u64>> {
        Ok(self
            .follows
            .iter()
            .filter(|e| e.followed_id == user_id)
            .map(|e| e.follower_id)
            .collect())
    }

    async fn like(&self, user_id: u64, activity_id: u64) -> Result<bool> {
        match self.likes.entry((user_id, activity_id)) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(LikeEdge {
                    user_id,
                    activity_id,
                    created_at: now_rfc3339(),
                });
                Ok(true)
            }
        }
    }

    async fn unlike(&self, user_id: u64, activity_id: u64) -> Result<bool> {
        Ok(self.likes.remove(&(user_id, activity_id)).is_some())
    }

    async fn like_count(&self, activity_id: u64) -> Result<u64> {
        Ok(self
            .likes
            .iter()
            .filter(|e| e.activity_id == activity_id)
            .count() as u64)
    }

    async fn has_liked(&self, user_id: u64, activity_id: u64) -> Result<bool> {
        Ok(self.likes.contains_key(&(user_id, activity_id)))
    }

    async fn liker_ids(&self, activity_id: u64) -> Result<Vec<u64>> {
        Ok(self
            .likes
            .iter()
            .filter(|e| e.activity_id == activity_id)
            .map(|e| e.user_id)
            .collect())
    }

    async fn add_comment(&self, new_comment: NewComment) -> Result<Comment> {
        let comment = new_comment.into_comment(self.allocate_id(), now_rfc3339());
        self.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, comment_id: u64) -> Result<Option<Comment>> {
        Ok(self.comments.get(&comment_id).map(|c| c.clone()))
    }

    async fn update_comment(&self, comment: &Comment) -> Result<()> {
        self.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn delete_comment(&self, comment_id: u64) -> Result<()> {
        self.comments.remove(&comment_id);
        Ok(())
    }

    async fn list_comments(&self, activity_id: u64, limit: usize) -> Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.activity_id == activity_id)
            .map(|c| c.clone())
            .collect();
        // IDs are allocated in creation order.
        comments.sort_by_key(|c| c.id);
        comments.truncate(limit);
        Ok(comments)
    }

    async fn comment_count(&self, activity_id: u64) -> Result<u64> {
        Ok(self
            .comments
            .iter()
            .filter(|c| c.activity_id == activity_id)
            .count() as u64)
    }
}
