// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Collections:
//! - `users` (profiles, keyed by user ID)
//! - `activities` (keyed by activity ID)
//! - `follows` and `likes` (edges keyed by the ID pair, so repeated writes
//!   are idempotent)
//! - `comments` (keyed by comment ID)

use crate::db::{collections, ActivityStore, SocialGraphStore, UserStore};
use crate::error::AppError;
use crate::models::{
    sort_newest_first, Activity, ActivityFilter, Comment, FollowEdge, LikeEdge, NewActivity,
    NewComment, NewUser, User,
};
use crate::time_utils::now_rfc3339;
use async_trait::async_trait;
use chrono::NaiveDate;
use futures_util::{stream, StreamExt};
use ring::rand::{SecureRandom, SystemRandom};

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;
/// Firestore caps `in` filters at 30 values.
const IN_QUERY_CHUNK: usize = 30;
/// IDs stay within 53 bits so they survive a round trip through JavaScript.
const ID_MASK: u64 = (1 << 53) - 1;

fn db_error(e: impl std::fmt::Display) -> AppError {
    AppError::Database(e.to_string())
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
    rng: SystemRandom,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
            rng: SystemRandom::new(),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
            rng: SystemRandom::new(),
        })
    }

    /// Create an offline client for testing.
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            client: None,
            rng: SystemRandom::new(),
        }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Random document ID. Firestore has no sequences.
    fn allocate_id(&self) -> Result<u64, AppError> {
        let mut bytes = [0u8; 8];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
        // Zero is never handed out so it can't be confused with a missing ID.
        Ok((u64::from_le_bytes(bytes) & ID_MASK).max(1))
    }

    // ─── Helper Methods ────────────────────────────────────────────

    async fn get_doc<T>(&self, collection: &str, doc_id: &str) -> Result<Option<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(doc_id)
            .await
            .map_err(db_error)
    }

    async fn set_doc<T>(&self, collection: &str, doc_id: &str, object: &T) -> Result<(), AppError>
    where
        T: serde::Serialize + for<'de> serde::Deserialize<'de> + Sync + Send,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(doc_id)
            .object(object)
            .execute()
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn delete_doc(&self, collection: &str, doc_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(doc_id)
            .execute()
            .await
            .map_err(db_error)?;
        Ok(())
    }

    /// All documents of `collection` whose `field` equals `value`.
    async fn query_eq<T>(&self, collection: &str, field: &str, value: u64) -> Result<Vec<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        let field = field.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(move |q| q.field(field.as_str()).eq(value))
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    /// All documents whose `field` is any of `values`, chunked to respect the
    /// `in` filter limit and fetched concurrently.
    async fn query_in<T>(
        &self,
        collection: &str,
        field: &str,
        values: &[u64],
        since: Option<NaiveDate>,
    ) -> Result<Vec<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        let client = self.get_client()?;
        let since = since.map(|d| d.to_string());

        let chunks: Vec<Vec<u64>> = values.chunks(IN_QUERY_CHUNK).map(<[u64]>::to_vec).collect();
        let results = stream::iter(chunks)
            .map(|chunk| {
                let since = since.clone();
                async move {
                    client
                        .fluent()
                        .select()
                        .from(collection)
                        .filter(move |q| {
                            q.for_all([
                                q.field(field).is_in(chunk.clone()),
                                since
                                    .clone()
                                    .and_then(|d| q.field("date").greater_than_or_equal(d)),
                            ])
                        })
                        .obj::<T>()
                        .query()
                        .await
                        .map_err(db_error)
                }
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<Vec<T>, AppError>>>()
            .await;

        let mut all = Vec::new();
        for result in results {
            all.extend(result?);
        }
        Ok(all)
    }

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<usize, AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(items.len())
    }

    /// Delete likes and comments attached to any of `activity_ids`.
    async fn delete_engagement(&self, activity_ids: &[u64]) -> Result<usize, AppError> {
        let likes: Vec<LikeEdge> = self
            .query_in(collections::LIKES, "activity_id", activity_ids, None)
            .await?;
        let comments: Vec<Comment> = self
            .query_in(collections::COMMENTS, "activity_id", activity_ids, None)
            .await?;

        let mut deleted = self
            .batch_delete(&likes, collections::LIKES, |l: &LikeEdge| {
                LikeEdge::doc_id(l.user_id, l.activity_id)
            })
            .await?;
        deleted += self
            .batch_delete(&comments, collections::COMMENTS, |c: &Comment| {
                c.id.to_string()
            })
            .await?;
        Ok(deleted)
    }
}

#[async_trait]
impl UserStore for FirestoreDb {
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        // Firestore has no unique indexes; check before writing.
        if self.find_user_by_pseudo(&new_user.pseudo).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Pseudo '{}' is already taken",
                new_user.pseudo
            )));
        }

        let email = new_user.email.clone();
        let same_email: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("email").eq(email.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(db_error)?;
        if !same_email.is_empty() {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }

        let user = new_user.into_user(self.allocate_id()?, now_rfc3339());
        self.set_doc(collections::USERS, &user.id.to_string(), &user)
            .await?;
        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    async fn get_user(&self, user_id: u64) -> Result<Option<User>, AppError> {
        self.get_doc(collections::USERS, &user_id.to_string()).await
    }

    async fn get_users(&self, user_ids: &[u64]) -> Result<Vec<User>, AppError> {
        self.query_in(collections::USERS, "id", user_ids, None).await
    }

    async fn find_user_by_pseudo(&self, pseudo: &str) -> Result<Option<User>, AppError> {
        let pseudo = pseudo.to_string();
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("pseudo").eq(pseudo.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(db_error)?;
        Ok(users.into_iter().next())
    }

    async fn search_users(&self, prefix: &str, limit: usize) -> Result<Vec<User>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS);

        let query = if prefix.is_empty() {
            query.order_by([("pseudo", firestore::FirestoreQueryDirection::Ascending)])
        } else {
            let start = prefix.to_string();
            let end = format!("{}\u{f8ff}", prefix);
            query
                .filter(move |q| {
                    q.for_all([
                        q.field("pseudo").greater_than_or_equal(start.clone()),
                        q.field("pseudo").less_than(end.clone()),
                    ])
                })
                .order_by([("pseudo", firestore::FirestoreQueryDirection::Ascending)])
        };

        query
            .limit(limit as u32)
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    async fn delete_user_data(&self, user_id: u64) -> Result<usize, AppError> {
        let mut deleted_count = 0;

        // 1. Activities with their likes and comments
        let activities: Vec<Activity> = self
            .query_eq(collections::ACTIVITIES, "user_id", user_id)
            .await?;
        let activity_ids: Vec<u64> = activities.iter().map(|a| a.id).collect();

        deleted_count += self.delete_engagement(&activity_ids).await?;
        deleted_count += self
            .batch_delete(&activities, collections::ACTIVITIES, |a: &Activity| {
                a.id.to_string()
            })
            .await?;
        tracing::debug!(user_id, count = activities.len(), "Deleted activities");

        // 2. Follow edges in both directions
        for field in ["follower_id", "followed_id"] {
            let edges: Vec<FollowEdge> = self.query_eq(collections::FOLLOWS, field, user_id).await?;
            deleted_count += self
                .batch_delete(&edges, collections::FOLLOWS, |e: &FollowEdge| {
                    FollowEdge::doc_id(e.follower_id, e.followed_id)
                })
                .await?;
        }

        // 3. Likes and comments left on other users' activities
        let likes: Vec<LikeEdge> = self.query_eq(collections::LIKES, "user_id", user_id).await?;
        deleted_count += self
            .batch_delete(&likes, collections::LIKES, |l: &LikeEdge| {
                LikeEdge::doc_id(l.user_id, l.activity_id)
            })
            .await?;

        let comments: Vec<Comment> = self
            .query_eq(collections::COMMENTS, "author_id", user_id)
            .await?;
        deleted_count += self
            .batch_delete(&comments, collections::COMMENTS, |c: &Comment| {
                c.id.to_string()
            })
            .await?;

        // 4. Profile
        if self.get_user(user_id).await?.is_some() {
            self.delete_doc(collections::USERS, &user_id.to_string())
                .await?;
            deleted_count += 1;
        }

        tracing::info!(user_id, deleted_count, "User data deletion complete");

        Ok(deleted_count)
    }
}

#[async_trait]
impl ActivityStore for FirestoreDb {
    async fn create_activity(&self, new_activity: NewActivity) -> Result<Activity, AppError> {
        let activity = new_activity.into_activity(self.allocate_id()?, now_rfc3339());
        self.set_doc(collections::ACTIVITIES, &activity.id.to_string(), &activity)
            .await?;
        Ok(activity)
    }

    async fn get_activity(&self, activity_id: u64) -> Result<Option<Activity>, AppError> {
        self.get_doc(collections::ACTIVITIES, &activity_id.to_string())
            .await
    }

    async fn list_activities(
        &self,
        user_id: u64,
        filter: &ActivityFilter,
    ) -> Result<Vec<Activity>, AppError> {
        let sport = filter.sport.clone();
        let from = filter.from.map(|d| d.to_string());
        let to = filter.to.map(|d| d.to_string());

        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    sport.clone().and_then(|s| q.field("sport").eq(s)),
                    from.clone()
                        .and_then(|d| q.field("date").greater_than_or_equal(d)),
                    to.clone().and_then(|d| q.field("date").less_than_or_equal(d)),
                ])
            })
            .order_by([("date", firestore::FirestoreQueryDirection::Descending)]);

        let query = match filter.limit {
            Some(limit) => query.limit(limit as u32),
            None => query,
        };

        let mut activities: Vec<Activity> = query.obj().query().await.map_err(db_error)?;
        sort_newest_first(&mut activities);
        Ok(activities)
    }

    async fn list_activities_for_users(
        &self,
        user_ids: &[u64],
        since: NaiveDate,
    ) -> Result<Vec<Activity>, AppError> {
        self.query_in(collections::ACTIVITIES, "user_id", user_ids, Some(since))
            .await
    }

    async fn update_activity(&self, activity: &Activity) -> Result<(), AppError> {
        self.set_doc(collections::ACTIVITIES, &activity.id.to_string(), activity)
            .await
    }

    async fn delete_activity(&self, activity_id: u64) -> Result<(), AppError> {
        let removed = self.delete_engagement(&[activity_id]).await?;
        self.delete_doc(collections::ACTIVITIES, &activity_id.to_string())
            .await?;
        tracing::debug!(activity_id, removed, "Deleted activity");
        Ok(())
    }
}

#[async_trait]
impl SocialGraphStore for FirestoreDb {
    async fn follow(&self, follower_id: u64, followed_id: u64) -> Result<bool, AppError> {
        let doc_id = FollowEdge::doc_id(follower_id, followed_id);
        if self
            .get_doc::<FollowEdge>(collections::FOLLOWS, &doc_id)
            .await?
            .is_some()
        {
            return Ok(false);
        }

        let edge = FollowEdge {
            follower_id,
            followed_id,
            created_at: now_rfc3339(),
        };
        self.set_doc(collections::FOLLOWS, &doc_id, &edge).await?;
        Ok(true)
    }

    async fn unfollow(&self, follower_id: u64, followed_id: u64) -> Result<bool, AppError> {
        let doc_id = FollowEdge::doc_id(follower_id, followed_id);
        if self
            .get_doc::<FollowEdge>(collections::FOLLOWS, &doc_id)
            .await?
            .is_none()
        {
            return Ok(false);
        }
        self.delete_doc(collections::FOLLOWS, &doc_id).await?;
        Ok(true)
    }

    async fn following_ids(&self, user_id: u64) -> Result<Vec<u64>, AppError> {
        let edges: Vec<FollowEdge> = self
            .query_eq(collections::FOLLOWS, "follower_id", user_id)
            .await?;
        Ok(edges.into_iter().map(|e| e.followed_id).collect())
    }

    async fn follower_ids(&self, user_id: u64) -> Result<Vec<u64>, AppError> {
        let edges: Vec<FollowEdge> = self
            .query_eq(collections::FOLLOWS, "followed_id", user_id)
            .await?;
        Ok(edges.into_iter().map(|e| e.follower_id).collect())
    }

    async fn like(&self, user_id: u64, activity_id: u64) -> Result<bool, AppError> {
        if self.has_liked(user_id, activity_id).await? {
            return Ok(false);
        }
        let edge = LikeEdge {
            user_id,
            activity_id,
            created_at: now_rfc3339(),
        };
        self.set_doc(
            collections::LIKES,
            &LikeEdge::doc_id(user_id, activity_id),
            &edge,
        )
        .await?;
        Ok(true)
    }

    async fn unlike(&self, user_id: u64, activity_id: u64) -> Result<bool, AppError> {
        if !self.has_liked(user_id, activity_id).await? {
            return Ok(false);
        }
        self.delete_doc(collections::LIKES, &LikeEdge::doc_id(user_id, activity_id))
            .await?;
        Ok(true)
    }

    async fn like_count(&self, activity_id: u64) -> Result<u64, AppError> {
        Ok(self.liker_ids(activity_id).await?.len() as u64)
    }

    async fn has_liked(&self, user_id: u64, activity_id: u64) -> Result<bool, AppError> {
        Ok(self
            .get_doc::<LikeEdge>(collections::LIKES, &LikeEdge::doc_id(user_id, activity_id))
            .await?
            .is_some())
    }

    async fn liker_ids(&self, activity_id: u64) -> Result<Vec<u64>, AppError> {
        let likes: Vec<LikeEdge> = self
            .query_eq(collections::LIKES, "activity_id", activity_id)
            .await?;
        Ok(likes.into_iter().map(|l| l.user_id).collect())
    }

    async fn add_comment(&self, new_comment: NewComment) -> Result<Comment, AppError> {
        let comment = new_comment.into_comment(self.allocate_id()?, now_rfc3339());
        self.set_doc(collections::COMMENTS, &comment.id.to_string(), &comment)
            .await?;
        Ok(comment)
    }

    async fn get_comment(&self, comment_id: u64) -> Result<Option<Comment>, AppError> {
        self.get_doc(collections::COMMENTS, &comment_id.to_string())
            .await
    }

    async fn update_comment(&self, comment: &Comment) -> Result<(), AppError> {
        self.set_doc(collections::COMMENTS, &comment.id.to_string(), comment)
            .await
    }

    async fn delete_comment(&self, comment_id: u64) -> Result<(), AppError> {
        self.delete_doc(collections::COMMENTS, &comment_id.to_string())
            .await
    }

    async fn list_comments(&self, activity_id: u64, limit: usize) -> Result<Vec<Comment>, AppError> {
        let mut comments: Vec<Comment> = self
            .query_eq(collections::COMMENTS, "activity_id", activity_id)
            .await?;
        // IDs are random here, so order by timestamp.
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        comments.truncate(limit);
        Ok(comments)
    }

    async fn comment_count(&self, activity_id: u64) -> Result<u64, AppError> {
        let comments: Vec<Comment> = self
            .query_eq(collections::COMMENTS, "activity_id", activity_id)
            .await?;
        Ok(comments.len() as u64)
    }
}
