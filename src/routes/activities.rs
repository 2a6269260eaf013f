// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity, like and comment routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    normalize_comment, Activity, ActivityFilter, ActivityUpdate, Comment, NewComment, PublicUser,
    MAX_CALORIES, MAX_DISTANCE_METERS, MAX_DURATION_SECONDS, MAX_ELEVATION_METERS,
};
use crate::routes::{api::require_user, bounded_param};
use crate::services::{ActivityRecorder, GpxImport, GpxSummary, ManualEntry};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const DEFAULT_LIST_LIMIT: u32 = 50;
const MAX_LIST_LIMIT: u32 = 200;
const DEFAULT_COMMENT_LIMIT: u32 = 100;
const MAX_COMMENT_LIMIT: u32 = 500;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", post(create_activity))
        .route("/api/activities/import", post(import_activity))
        .route(
            "/api/activities/{id}",
            get(get_activity).put(update_activity).delete(delete_activity),
        )
        .route("/api/activities/{id}/like", post(like).delete(unlike))
        .route("/api/activities/{id}/likes", get(get_likers))
        .route(
            "/api/activities/{id}/comments",
            get(list_comments).post(add_comment),
        )
        .route(
            "/api/comments/{id}",
            put(update_comment).delete(delete_comment),
        )
        .route("/api/users/{id}/activities", get(list_user_activities))
        .route("/api/users/{id}/sports", get(list_user_sports))
}

async fn require_activity(state: &AppState, activity_id: u64) -> Result<Activity> {
    state
        .db
        .get_activity(activity_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Activity {} not found", activity_id)))
}

/// Load an activity the caller owns.
async fn require_owned_activity(
    state: &AppState,
    user_id: u64,
    activity_id: u64,
) -> Result<Activity> {
    let activity = require_activity(state, activity_id).await?;
    if activity.user_id != user_id {
        return Err(AppError::Forbidden(
            "Only the owner can modify this activity".to_string(),
        ));
    }
    Ok(activity)
}

// ─── Creation ────────────────────────────────────────────────

/// Manually entered workout.
#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CreateActivityRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub sport: String,
    pub date: NaiveDate,
    #[serde(default)]
    #[validate(range(min = 0, max = MAX_DURATION_SECONDS))]
    pub duration_seconds: Option<i64>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = MAX_DISTANCE_METERS))]
    pub distance_meters: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0, max = MAX_ELEVATION_METERS))]
    pub elevation_gain_meters: Option<i64>,
    #[serde(default)]
    #[validate(range(min = 0, max = MAX_CALORIES))]
    pub calories: Option<i64>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

async fn create_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateActivityRequest>,
) -> Result<(StatusCode, Json<Activity>)> {
    request.validate()?;

    let activity = ActivityRecorder::new(state.db.as_ref())
        .record_manual(
            user.user_id,
            ManualEntry {
                name: request.name,
                sport: request.sport,
                date: request.date,
                duration_seconds: request.duration_seconds,
                distance_meters: request.distance_meters,
                elevation_gain_meters: request.elevation_gain_meters,
                calories: request.calories,
                description: request.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(activity)))
}

/// Activity built from an uploaded GPX track. The track itself is parsed
/// upstream; only its summary arrives here.
#[derive(Debug, Deserialize, Validate)]
pub struct ImportActivityRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub sport: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(default)]
    pub gpx_reference: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, max = MAX_CALORIES))]
    pub calories: Option<i64>,
    pub summary: GpxSummary,
}

async fn import_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ImportActivityRequest>,
) -> Result<(StatusCode, Json<Activity>)> {
    request.validate()?;

    let activity = ActivityRecorder::new(state.db.as_ref())
        .import_gpx(
            user.user_id,
            GpxImport {
                name: request.name,
                sport: request.sport,
                description: request.description,
                gpx_reference: request.gpx_reference,
                calories: request.calories,
                summary: request.summary,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(activity)))
}

// ─── Single Activity ─────────────────────────────────────────

/// An activity with its engagement as seen by the caller.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityDetail {
    #[serde(flatten)]
    pub activity: Activity,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub like_count: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub comment_count: u64,
    pub liked_by_me: bool,
}

async fn get_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(activity_id): Path<u64>,
) -> Result<Json<ActivityDetail>> {
    let activity = require_activity(&state, activity_id).await?;

    let (like_count, comment_count, liked_by_me) = tokio::try_join!(
        state.db.like_count(activity_id),
        state.db.comment_count(activity_id),
        state.db.has_liked(user.user_id, activity_id)
    )?;

    Ok(Json(ActivityDetail {
        activity,
        like_count,
        comment_count,
        liked_by_me,
    }))
}

/// Editable activity fields. Absent fields are left untouched.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateActivityRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub sport: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

async fn update_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(activity_id): Path<u64>,
    Json(request): Json<UpdateActivityRequest>,
) -> Result<Json<Activity>> {
    request.validate()?;

    let update = ActivityUpdate {
        name: request.name,
        sport: request.sport,
        description: request.description,
    };
    if update.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    let mut activity = require_owned_activity(&state, user.user_id, activity_id).await?;
    update.apply(&mut activity);
    state.db.update_activity(&activity).await?;

    tracing::info!(user_id = user.user_id, activity_id, "Activity updated");
    Ok(Json(activity))
}

async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(activity_id): Path<u64>,
) -> Result<StatusCode> {
    require_owned_activity(&state, user.user_id, activity_id).await?;
    state.db.delete_activity(activity_id).await?;

    tracing::info!(user_id = user.user_id, activity_id, "Activity deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ─── Listings ────────────────────────────────────────────────

#[derive(Deserialize)]
struct ActivitiesQuery {
    /// Exact sport name
    sport: Option<String>,
    /// Inclusive lower date bound
    from: Option<NaiveDate>,
    /// Inclusive upper date bound
    to: Option<NaiveDate>,
    limit: Option<u32>,
}

async fn list_user_activities(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u64>,
    Query(params): Query<ActivitiesQuery>,
) -> Result<Json<Vec<Activity>>> {
    let limit = bounded_param("limit", params.limit, DEFAULT_LIST_LIMIT, 1..=MAX_LIST_LIMIT)?;
    if let (Some(from), Some(to)) = (params.from, params.to) {
        if from > to {
            return Err(AppError::BadRequest(
                "'from' must not be after 'to'".to_string(),
            ));
        }
    }
    require_user(&state, user_id).await?;

    let filter = ActivityFilter {
        sport: params.sport,
        from: params.from,
        to: params.to,
        limit: Some(limit as usize),
    };

    tracing::debug!(user_id, ?filter, "Listing activities");

    Ok(Json(state.db.list_activities(user_id, &filter).await?))
}

/// Sports a user has logged, sorted.
async fn list_user_sports(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u64>,
) -> Result<Json<Vec<String>>> {
    require_user(&state, user_id).await?;

    let sports: BTreeSet<String> = state
        .db
        .list_activities(user_id, &ActivityFilter::default())
        .await?
        .into_iter()
        .map(|a| a.sport)
        .collect();

    Ok(Json(sports.into_iter().collect()))
}

// ─── Likes ───────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LikeResponse {
    pub liked: bool,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub like_count: u64,
}

async fn like(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(activity_id): Path<u64>,
) -> Result<Json<LikeResponse>> {
    require_activity(&state, activity_id).await?;

    if state.db.like(user.user_id, activity_id).await? {
        tracing::debug!(user_id = user.user_id, activity_id, "Activity liked");
    }

    Ok(Json(LikeResponse {
        liked: true,
        like_count: state.db.like_count(activity_id).await?,
    }))
}

async fn unlike(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(activity_id): Path<u64>,
) -> Result<Json<LikeResponse>> {
    require_activity(&state, activity_id).await?;

    if state.db.unlike(user.user_id, activity_id).await? {
        tracing::debug!(user_id = user.user_id, activity_id, "Activity unliked");
    }

    Ok(Json(LikeResponse {
        liked: false,
        like_count: state.db.like_count(activity_id).await?,
    }))
}

async fn get_likers(
    State(state): State<Arc<AppState>>,
    Path(activity_id): Path<u64>,
) -> Result<Json<Vec<PublicUser>>> {
    require_activity(&state, activity_id).await?;

    let ids = state.db.liker_ids(activity_id).await?;
    let users = state.db.get_users(&ids).await?;
    Ok(Json(users.iter().map(PublicUser::from).collect()))
}

// ─── Comments ────────────────────────────────────────────────

/// A comment with its author's public profile.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: PublicUser,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(max = 2000))]
    pub content: String,
}

impl CommentRequest {
    fn content(&self) -> Result<String> {
        self.validate()?;
        normalize_comment(&self.content)
            .ok_or_else(|| AppError::BadRequest("Comment must not be blank".to_string()))
    }
}

#[derive(Deserialize)]
struct CommentsQuery {
    limit: Option<u32>,
}

async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(activity_id): Path<u64>,
    Query(params): Query<CommentsQuery>,
) -> Result<Json<Vec<CommentView>>> {
    let limit = bounded_param(
        "limit",
        params.limit,
        DEFAULT_COMMENT_LIMIT,
        1..=MAX_COMMENT_LIMIT,
    )?;
    require_activity(&state, activity_id).await?;

    let comments = state.db.list_comments(activity_id, limit as usize).await?;

    let mut author_ids: Vec<u64> = comments.iter().map(|c| c.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();
    let authors: HashMap<u64, PublicUser> = state
        .db
        .get_users(&author_ids)
        .await?
        .iter()
        .map(|u| (u.id, PublicUser::from(u)))
        .collect();

    // Comments whose author has since left are skipped.
    let views = comments
        .into_iter()
        .filter_map(|comment| {
            let author = authors.get(&comment.author_id)?.clone();
            Some(CommentView { comment, author })
        })
        .collect();

    Ok(Json(views))
}

async fn add_comment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(activity_id): Path<u64>,
    Json(request): Json<CommentRequest>,
) -> Result<(StatusCode, Json<CommentView>)> {
    let content = request.content()?;
    require_activity(&state, activity_id).await?;
    let author = require_user(&state, user.user_id).await?;

    let comment = state
        .db
        .add_comment(NewComment {
            activity_id,
            author_id: user.user_id,
            content,
        })
        .await?;

    tracing::info!(
        user_id = user.user_id,
        activity_id,
        comment_id = comment.id,
        "Comment added"
    );

    Ok((
        StatusCode::CREATED,
        Json(CommentView {
            comment,
            author: PublicUser::from(&author),
        }),
    ))
}

/// Load a comment the caller wrote.
async fn require_own_comment(state: &AppState, user_id: u64, comment_id: u64) -> Result<Comment> {
    let comment = state
        .db
        .get_comment(comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", comment_id)))?;

    if comment.author_id != user_id {
        return Err(AppError::Forbidden(
            "Only the author can modify this comment".to_string(),
        ));
    }
    Ok(comment)
}

async fn update_comment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(comment_id): Path<u64>,
    Json(request): Json<CommentRequest>,
) -> Result<Json<Comment>> {
    let content = request.content()?;
    let mut comment = require_own_comment(&state, user.user_id, comment_id).await?;

    comment.content = content;
    state.db.update_comment(&comment).await?;

    Ok(Json(comment))
}

async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(comment_id): Path<u64>,
) -> Result<StatusCode> {
    require_own_comment(&state, user.user_id, comment_id).await?;
    state.db.delete_comment(comment_id).await?;

    tracing::info!(user_id = user.user_id, comment_id, "Comment deleted");
    Ok(StatusCode::NO_CONTENT)
}
