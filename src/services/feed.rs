// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity feed: recent activities of the users a viewer follows.
//!
//! Assembly runs in four steps:
//! 1. Look up who the viewer follows
//! 2. Fetch their activities inside the lookback window
//! 3. Sort newest first and truncate globally
//! 4. Attach like/comment counts and the viewer's like state per item

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{sort_newest_first, Activity, PublicUser};
use crate::stats::round_to;
use crate::time_utils::days_ago;
use chrono::NaiveDate;
use futures_util::{stream, StreamExt};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Engagement lookups in flight at once while decorating a feed.
const MAX_CONCURRENT_LOOKUPS: usize = 16;

/// Upper bound on feed items considered when computing a digest.
pub const DIGEST_FEED_LIMIT: usize = 1000;

/// One feed entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FeedItem {
    pub activity: Activity,
    pub owner: PublicUser,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub like_count: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub comment_count: u64,
    pub viewer_has_liked: bool,
}

/// Builds feeds from the stores.
pub struct FeedAssembler<'a> {
    db: &'a dyn Database,
}

impl<'a> FeedAssembler<'a> {
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Feed of `viewer_id` as of `today`, newest first.
    ///
    /// Activities dated on or after `today - lookback_days` are considered;
    /// at most `limit` are returned. Activities whose owner no longer exists
    /// are dropped.
    pub async fn feed(
        &self,
        viewer_id: u64,
        lookback_days: u32,
        limit: usize,
        today: NaiveDate,
    ) -> Result<Vec<FeedItem>> {
        let following = self.db.following_ids(viewer_id).await?;
        if following.is_empty() {
            tracing::debug!(viewer_id, "Viewer follows nobody, empty feed");
            return Ok(Vec::new());
        }

        let since = days_ago(today, lookback_days);
        let mut activities = self
            .db
            .list_activities_for_users(&following, since)
            .await?;

        let owners: HashMap<u64, PublicUser> = self
            .db
            .get_users(&following)
            .await?
            .iter()
            .map(|u| (u.id, PublicUser::from(u)))
            .collect();
        activities.retain(|a| owners.contains_key(&a.user_id));

        sort_newest_first(&mut activities);
        activities.truncate(limit);

        let db = self.db;
        let owned: Vec<(Activity, PublicUser)> = activities
            .into_iter()
            .filter_map(|a| owners.get(&a.user_id).cloned().map(|owner| (a, owner)))
            .collect();

        // `buffered` keeps the date order while running lookups concurrently.
        let items: Vec<Result<FeedItem>> = stream::iter(owned)
            .map(|(activity, owner)| async move {
                let (like_count, comment_count, viewer_has_liked) = tokio::try_join!(
                    db.like_count(activity.id),
                    db.comment_count(activity.id),
                    db.has_liked(viewer_id, activity.id),
                )?;
                Ok::<_, AppError>(FeedItem {
                    activity,
                    owner,
                    like_count,
                    comment_count,
                    viewer_has_liked,
                })
            })
            .buffered(MAX_CONCURRENT_LOOKUPS)
            .collect()
            .await;

        let items = items.into_iter().collect::<Result<Vec<_>>>()?;
        tracing::debug!(viewer_id, count = items.len(), "Feed assembled");
        Ok(items)
    }
}

/// Engagement statistics over an assembled feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FeedDigest {
    pub period_days: u32,
    pub activity_count: usize,
    /// Distinct owners with at least one activity in the feed
    pub active_users: usize,
    pub sports: BTreeMap<String, u32>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_likes: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_comments: u64,
    pub avg_likes_per_activity: f64,
    pub avg_comments_per_activity: f64,
}

impl FeedDigest {
    pub fn from_items(items: &[FeedItem], period_days: u32) -> Self {
        let mut sports: BTreeMap<String, u32> = BTreeMap::new();
        let mut owners = HashSet::new();
        let mut total_likes = 0;
        let mut total_comments = 0;

        for item in items {
            owners.insert(item.owner.id);
            *sports.entry(item.activity.sport.clone()).or_insert(0) += 1;
            total_likes += item.like_count;
            total_comments += item.comment_count;
        }

        let average = |total: u64| {
            if items.is_empty() {
                0.0
            } else {
                round_to(total as f64 / items.len() as f64, 2)
            }
        };

        Self {
            period_days,
            activity_count: items.len(),
            active_users: owners.len(),
            sports,
            total_likes,
            total_comments,
            avg_likes_per_activity: average(total_likes),
            avg_comments_per_activity: average(total_comments),
        }
    }
}
