// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity feed routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::routes::bounded_param;
use crate::services::feed::DIGEST_FEED_LIMIT;
use crate::services::{FeedAssembler, FeedDigest, FeedItem};
use crate::time_utils::today_utc;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_DAYS: u32 = 7;
const MAX_DAYS: u32 = 365;
const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 200;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/feed/{id}", get(get_feed))
        .route("/api/feed/{id}/digest", get(get_digest))
}

#[derive(Deserialize)]
struct FeedQuery {
    days: Option<u32>,
    limit: Option<u32>,
}

/// A feed is private to its viewer.
fn ensure_viewer(user: AuthUser, viewer_id: u64) -> Result<()> {
    if user.user_id == viewer_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Feeds can only be read by their owner".to_string(),
        ))
    }
}

async fn get_feed(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(viewer_id): Path<u64>,
    Query(params): Query<FeedQuery>,
) -> Result<Json<Vec<FeedItem>>> {
    ensure_viewer(user, viewer_id)?;
    let days = bounded_param("days", params.days, DEFAULT_DAYS, 1..=MAX_DAYS)?;
    let limit = bounded_param("limit", params.limit, DEFAULT_LIMIT, 1..=MAX_LIMIT)?;

    let items = FeedAssembler::new(state.db.as_ref())
        .feed(viewer_id, days, limit as usize, today_utc())
        .await?;

    tracing::debug!(viewer_id, days, limit, items = items.len(), "Feed assembled");
    Ok(Json(items))
}

#[derive(Deserialize)]
struct DigestQuery {
    days: Option<u32>,
}

async fn get_digest(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(viewer_id): Path<u64>,
    Query(params): Query<DigestQuery>,
) -> Result<Json<FeedDigest>> {
    ensure_viewer(user, viewer_id)?;
    let days = bounded_param("days", params.days, DEFAULT_DAYS, 1..=MAX_DAYS)?;

    let items = FeedAssembler::new(state.db.as_ref())
        .feed(viewer_id, days, DIGEST_FEED_LIMIT, today_utc())
        .await?;

    Ok(Json(FeedDigest::from_items(&items, days)))
}
