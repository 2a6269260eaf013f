// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for profiles and the follow graph.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{PublicUser, User};
use crate::routes::bounded_param;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const DEFAULT_SEARCH_LIMIT: u32 = 20;
const MAX_SEARCH_LIMIT: u32 = 100;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/account", delete(delete_account))
        .route("/api/users", get(search_users))
        .route("/api/users/{id}", get(get_profile))
        .route("/api/users/{id}/followers", get(get_followers))
        .route("/api/users/{id}/following", get(get_following))
        .route("/api/users/{id}/follow", post(follow).delete(unfollow))
}

/// Load a user or fail with 404.
pub(crate) async fn require_user(state: &AppState, user_id: u64) -> Result<User> {
    state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub pseudo: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<u32>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            pseudo: user.pseudo,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            age: user.age,
            height_cm: user.height_cm,
            weight_kg: user.weight_kg,
            created_at: user.created_at,
        }
    }
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = require_user(&state, user.user_id).await?;
    Ok(Json(profile.into()))
}

/// Public profile with follow counts.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: PublicUser,
    pub followers_count: usize,
    pub following_count: usize,
    /// Whether the caller follows this user.
    pub followed_by_me: bool,
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<AuthUser>,
    Path(user_id): Path<u64>,
) -> Result<Json<ProfileResponse>> {
    let user = require_user(&state, user_id).await?;

    let (followers, following) = tokio::try_join!(
        state.db.follower_ids(user_id),
        state.db.following_ids(user_id)
    )?;

    Ok(Json(ProfileResponse {
        user: PublicUser::from(&user),
        followed_by_me: followers.contains(&viewer.user_id),
        followers_count: followers.len(),
        following_count: following.len(),
    }))
}

// ─── Search ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct SearchQuery {
    /// Pseudo prefix
    #[serde(default)]
    search: String,
    limit: Option<u32>,
}

async fn search_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<PublicUser>>> {
    let limit = bounded_param(
        "limit",
        params.limit,
        DEFAULT_SEARCH_LIMIT,
        1..=MAX_SEARCH_LIMIT,
    )?;
    let prefix = params.search.trim();
    if prefix.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let users = state.db.search_users(prefix, limit as usize).await?;
    Ok(Json(users.iter().map(PublicUser::from).collect()))
}

// ─── Follow Graph ────────────────────────────────────────────

async fn public_users(state: &AppState, ids: &[u64]) -> Result<Vec<PublicUser>> {
    let mut users: Vec<PublicUser> = state
        .db
        .get_users(ids)
        .await?
        .iter()
        .map(PublicUser::from)
        .collect();
    users.sort_by(|a, b| a.pseudo.cmp(&b.pseudo));
    Ok(users)
}

async fn get_followers(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u64>,
) -> Result<Json<Vec<PublicUser>>> {
    require_user(&state, user_id).await?;
    let ids = state.db.follower_ids(user_id).await?;
    Ok(Json(public_users(&state, &ids).await?))
}

async fn get_following(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u64>,
) -> Result<Json<Vec<PublicUser>>> {
    require_user(&state, user_id).await?;
    let ids = state.db.following_ids(user_id).await?;
    Ok(Json(public_users(&state, &ids).await?))
}

/// Follow state after a follow or unfollow.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FollowResponse {
    pub following: bool,
    /// Followers of the target user
    pub followers_count: usize,
    /// Users the caller follows
    pub following_count: usize,
}

async fn follow_response(state: &AppState, follower: u64, target: u64) -> Result<FollowResponse> {
    let (followers, following) = tokio::try_join!(
        state.db.follower_ids(target),
        state.db.following_ids(follower)
    )?;

    Ok(FollowResponse {
        following: following.contains(&target),
        followers_count: followers.len(),
        following_count: following.len(),
    })
}

async fn follow(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(target): Path<u64>,
) -> Result<Json<FollowResponse>> {
    if target == user.user_id {
        return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
    }
    require_user(&state, target).await?;

    if state.db.follow(user.user_id, target).await? {
        tracing::info!(follower_id = user.user_id, followed_id = target, "Followed user");
    }

    Ok(Json(follow_response(&state, user.user_id, target).await?))
}

async fn unfollow(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(target): Path<u64>,
) -> Result<Json<FollowResponse>> {
    if target == user.user_id {
        return Err(AppError::BadRequest("Cannot unfollow yourself".to_string()));
    }
    require_user(&state, target).await?;

    if state.db.unfollow(user.user_id, target).await? {
        tracing::info!(follower_id = user.user_id, followed_id = target, "Unfollowed user");
    }

    Ok(Json(follow_response(&state, user.user_id, target).await?))
}

// ─── Account Deletion ────────────────────────────────────────

/// Response for account deletion.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteAccountResponse {
    pub success: bool,
    pub deleted_records: usize,
}

/// Delete the caller's account and everything attached to it.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DeleteAccountResponse>> {
    tracing::info!(user_id = user.user_id, "User-initiated account deletion");

    require_user(&state, user.user_id).await?;
    let deleted_records = state.db.delete_user_data(user.user_id).await?;

    tracing::info!(user_id = user.user_id, deleted_records, "Account deleted");

    Ok(Json(DeleteAccountResponse {
        success: true,
        deleted_records,
    }))
}
