// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity recording service.
//!
//! Handles both ways an activity enters the system:
//! 1. Manual entry with user-supplied metrics
//! 2. Import of a GPX track summary, with calories estimated when absent

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{
    Activity, NewActivity, MAX_DISTANCE_METERS, MAX_DURATION_SECONDS, MAX_ELEVATION_METERS,
};
use crate::services::calories::estimate_calories;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

/// Summary of a parsed GPX track. Parsing happens upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct GpxSummary {
    pub start_date: DateTime<Utc>,
    pub duration_seconds: i64,
    /// Positive elevation gain in meters
    pub elevation_gain: f64,
    /// Number of track points; zero means the file held no track
    pub point_count: u32,
    #[serde(default)]
    pub distance_meters: Option<f64>,
}

/// Details the user adds on top of the track summary.
#[derive(Debug, Clone)]
pub struct GpxImport {
    pub name: String,
    pub sport: String,
    pub description: Option<String>,
    pub gpx_reference: Option<String>,
    /// Measured calories, if the user has them
    pub calories: Option<i64>,
    pub summary: GpxSummary,
}

impl GpxImport {
    /// Convert into an activity record for `user_id`.
    pub fn into_new_activity(self, user_id: u64) -> Result<NewActivity> {
        let summary = self.summary;
        if summary.point_count == 0 {
            return Err(AppError::BadRequest("GPX track has no points".to_string()));
        }
        if summary.duration_seconds < 0 {
            return Err(AppError::BadRequest(
                "GPX duration cannot be negative".to_string(),
            ));
        }
        if summary.duration_seconds > MAX_DURATION_SECONDS {
            return Err(AppError::BadRequest(format!(
                "GPX duration exceeds {} seconds",
                MAX_DURATION_SECONDS
            )));
        }
        if !(0.0..=MAX_ELEVATION_METERS as f64).contains(&summary.elevation_gain) {
            return Err(AppError::BadRequest(format!(
                "GPX elevation gain must be between 0 and {} meters",
                MAX_ELEVATION_METERS
            )));
        }
        if summary
            .distance_meters
            .is_some_and(|m| !(0.0..=MAX_DISTANCE_METERS).contains(&m))
        {
            return Err(AppError::BadRequest(format!(
                "GPX distance must be between 0 and {} meters",
                MAX_DISTANCE_METERS
            )));
        }

        let hours = summary.duration_seconds as f64 / 3600.0;
        let calories = self
            .calories
            .unwrap_or_else(|| estimate_calories(&self.sport, hours, summary.elevation_gain));

        Ok(NewActivity {
            user_id,
            name: self.name,
            sport: self.sport,
            date: summary.start_date.date_naive(),
            duration_seconds: Some(summary.duration_seconds),
            distance_meters: summary.distance_meters,
            elevation_gain_meters: Some(summary.elevation_gain.round() as i64),
            calories: Some(calories),
            description: self.description,
            gpx_reference: self.gpx_reference,
        })
    }
}

/// User-supplied fields of a manual activity.
#[derive(Debug, Clone)]
pub struct ManualEntry {
    pub name: String,
    pub sport: String,
    pub date: NaiveDate,
    pub duration_seconds: Option<i64>,
    pub distance_meters: Option<f64>,
    pub elevation_gain_meters: Option<i64>,
    pub calories: Option<i64>,
    pub description: Option<String>,
}

/// Records activities on behalf of users.
pub struct ActivityRecorder<'a> {
    db: &'a dyn Database,
}

impl<'a> ActivityRecorder<'a> {
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Store a manually entered activity.
    pub async fn record_manual(&self, user_id: u64, entry: ManualEntry) -> Result<Activity> {
        let activity = self
            .db
            .create_activity(NewActivity {
                user_id,
                name: entry.name,
                sport: entry.sport,
                date: entry.date,
                duration_seconds: entry.duration_seconds,
                distance_meters: entry.distance_meters,
                elevation_gain_meters: entry.elevation_gain_meters,
                calories: entry.calories,
                description: entry.description,
                gpx_reference: None,
            })
            .await?;

        tracing::info!(
            user_id,
            activity_id = activity.id,
            sport = %activity.sport,
            "Manual activity recorded"
        );
        Ok(activity)
    }

    /// Store an activity built from a GPX summary.
    pub async fn import_gpx(&self, user_id: u64, import: GpxImport) -> Result<Activity> {
        let point_count = import.summary.point_count;
        let new_activity = import.into_new_activity(user_id)?;
        let activity = self.db.create_activity(new_activity).await?;

        tracing::info!(
            user_id,
            activity_id = activity.id,
            point_count,
            calories = activity.calories,
            "GPX activity imported"
        );
        Ok(activity)
    }
}
