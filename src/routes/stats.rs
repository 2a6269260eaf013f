// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Statistics routes.
//!
//! Every endpoint loads the user's activities for the requested window and
//! hands them to one of the pure aggregators in [`crate::stats`].

use crate::error::Result;
use crate::models::{Activity, ActivityFilter};
use crate::routes::{api::require_user, bounded_param};
use crate::stats::{
    aggregate_by_sport, analyze_progression, personal_records, round_to, Dashboard, Progression,
    SportAggregate, SportRecords, Summary, WeekKey, WeeklyAggregate, WeeklyTotals,
};
use crate::time_utils::{today_utc, weeks_ago};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

const DEFAULT_WEEKS: u32 = 12;
const MAX_WEEKS: u32 = 520;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/{id}/stats/weekly", get(weekly_stats))
        .route("/api/users/{id}/stats/by-sport", get(sport_stats))
        .route("/api/users/{id}/stats/records", get(records))
        .route(
            "/api/users/{id}/stats/progression/{sport}",
            get(progression),
        )
        .route("/api/users/{id}/stats/summary", get(summary))
        .route("/api/users/{id}/stats/dashboard", get(dashboard))
}

#[derive(Deserialize)]
struct WindowQuery {
    weeks: Option<u32>,
}

impl WindowQuery {
    fn weeks(&self) -> Result<u32> {
        bounded_param("weeks", self.weeks, DEFAULT_WEEKS, 1..=MAX_WEEKS)
    }
}

/// Activities of an existing user, optionally restricted.
async fn load_activities(
    state: &AppState,
    user_id: u64,
    filter: ActivityFilter,
) -> Result<Vec<Activity>> {
    require_user(state, user_id).await?;
    let activities = state.db.list_activities(user_id, &filter).await?;
    tracing::debug!(
        user_id,
        count = activities.len(),
        ?filter,
        "Loaded activities for stats"
    );
    Ok(activities)
}

// ─── Weekly ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct WeeklyStatsResponse {
    pub period_weeks: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub activities_per_week: BTreeMap<WeekKey, BTreeMap<String, u32>>,
    pub hours_per_week: BTreeMap<WeekKey, f64>,
    pub km_per_week: BTreeMap<WeekKey, f64>,
    pub totals: WeeklyTotals,
}

async fn weekly_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u64>,
    Query(params): Query<WindowQuery>,
) -> Result<Json<WeeklyStatsResponse>> {
    let weeks = params.weeks()?;
    let end_date = today_utc();
    let start_date = weeks_ago(end_date, weeks);

    let activities = load_activities(&state, user_id, ActivityFilter::since(start_date)).await?;
    let aggregate = WeeklyAggregate::from_activities(&activities);
    let totals = aggregate.totals(weeks);

    let round_values = |map: BTreeMap<WeekKey, f64>| -> BTreeMap<WeekKey, f64> {
        map.into_iter().map(|(k, v)| (k, round_to(v, 2))).collect()
    };

    Ok(Json(WeeklyStatsResponse {
        period_weeks: weeks,
        start_date,
        end_date,
        activities_per_week: aggregate.counts,
        hours_per_week: round_values(aggregate.hours),
        km_per_week: round_values(aggregate.distance_km),
        totals,
    }))
}

// ─── Per Sport ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SportStatsResponse {
    pub period_weeks: u32,
    pub sports: BTreeMap<String, SportAggregate>,
}

async fn sport_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u64>,
    Query(params): Query<WindowQuery>,
) -> Result<Json<SportStatsResponse>> {
    let weeks = params.weeks()?;
    let since = weeks_ago(today_utc(), weeks);

    let activities = load_activities(&state, user_id, ActivityFilter::since(since)).await?;

    Ok(Json(SportStatsResponse {
        period_weeks: weeks,
        sports: aggregate_by_sport(&activities),
    }))
}

// ─── Records & Progression ───────────────────────────────────

async fn records(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u64>,
) -> Result<Json<BTreeMap<String, SportRecords>>> {
    let activities = load_activities(&state, user_id, ActivityFilter::default()).await?;
    Ok(Json(personal_records(&activities)))
}

async fn progression(
    State(state): State<Arc<AppState>>,
    Path((user_id, sport)): Path<(u64, String)>,
    Query(params): Query<WindowQuery>,
) -> Result<Json<Progression>> {
    let weeks = params.weeks()?;
    let filter = ActivityFilter {
        sport: Some(sport.clone()),
        ..ActivityFilter::since(weeks_ago(today_utc(), weeks))
    };

    let activities = load_activities(&state, user_id, filter).await?;
    Ok(Json(analyze_progression(&sport, &activities, weeks)))
}

// ─── Summary ─────────────────────────────────────────────────

async fn summary(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u64>,
) -> Result<Json<Summary>> {
    let activities = load_activities(&state, user_id, ActivityFilter::default()).await?;
    Ok(Json(Summary::from_activities(&activities)))
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u64>,
) -> Result<Json<Dashboard>> {
    let activities = load_activities(&state, user_id, ActivityFilter::default()).await?;
    Ok(Json(Dashboard::build(&activities, today_utc())))
}
