// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity model for storage and API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Longest accepted activity: one week.
pub const MAX_DURATION_SECONDS: i64 = 7 * 24 * 3600;
pub const MAX_DISTANCE_METERS: f64 = 5_000_000.0;
pub const MAX_ELEVATION_METERS: i64 = 100_000;
pub const MAX_CALORIES: i64 = 100_000;

/// Stored activity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Activity {
    /// Activity ID (also used as document ID)
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    /// Owning user
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub user_id: u64,
    /// Activity name/title
    pub name: String,
    /// Free-text sport ("Course", "Vélo", ...)
    pub sport: String,
    /// Calendar date of the activity
    pub date: NaiveDate,
    /// Duration in seconds (may be missing on malformed records)
    #[serde(default)]
    pub duration_seconds: Option<i64>,
    /// Distance in meters
    #[serde(default)]
    pub distance_meters: Option<f64>,
    /// Positive elevation gain in meters
    #[serde(default)]
    pub elevation_gain_meters: Option<i64>,
    /// Calories burnt (estimated for GPX imports)
    #[serde(default)]
    pub calories: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    /// Opaque reference to the uploaded GPX track
    #[serde(default)]
    pub gpx_reference: Option<String>,
    /// When this activity was recorded (RFC3339)
    pub created_at: String,
}

impl Activity {
    /// Duration in seconds, with missing or negative values read as 0.
    pub fn duration_secs(&self) -> u64 {
        self.duration_seconds.unwrap_or(0).max(0) as u64
    }

    /// Distance in kilometers, `None` when the activity carries no distance.
    pub fn distance_km(&self) -> Option<f64> {
        self.distance_meters.map(|m| m.max(0.0) / 1000.0)
    }

    pub fn elevation_gain(&self) -> u64 {
        self.elevation_gain_meters.unwrap_or(0).max(0) as u64
    }

    pub fn calories_burnt(&self) -> u64 {
        self.calories.unwrap_or(0).max(0) as u64
    }
}

/// Fields supplied when recording a new activity.
#[derive(Debug, Clone, Default)]
pub struct NewActivity {
    pub user_id: u64,
    pub name: String,
    pub sport: String,
    pub date: NaiveDate,
    pub duration_seconds: Option<i64>,
    pub distance_meters: Option<f64>,
    pub elevation_gain_meters: Option<i64>,
    pub calories: Option<i64>,
    pub description: Option<String>,
    pub gpx_reference: Option<String>,
}

impl NewActivity {
    /// Materialize the stored record once the store has assigned an ID.
    pub fn into_activity(self, id: u64, created_at: String) -> Activity {
        Activity {
            id,
            user_id: self.user_id,
            name: self.name,
            sport: self.sport,
            date: self.date,
            duration_seconds: self.duration_seconds,
            distance_meters: self.distance_meters,
            elevation_gain_meters: self.elevation_gain_meters,
            calories: self.calories,
            description: self.description,
            gpx_reference: self.gpx_reference,
            created_at,
        }
    }
}

/// Editable fields of an activity. Metrics and date are fixed once recorded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityUpdate {
    pub name: Option<String>,
    pub sport: Option<String>,
    pub description: Option<String>,
}

impl ActivityUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.sport.is_none() && self.description.is_none()
    }

    pub fn apply(&self, activity: &mut Activity) {
        if let Some(name) = &self.name {
            activity.name = name.clone();
        }
        if let Some(sport) = &self.sport {
            activity.sport = sport.clone();
        }
        if let Some(description) = &self.description {
            activity.description = Some(description.clone());
        }
    }
}

/// Filters for listing a user's activities.
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    /// Exact sport match
    pub sport: Option<String>,
    /// Inclusive lower date bound
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound
    pub to: Option<NaiveDate>,
    pub limit: Option<usize>,
}

impl ActivityFilter {
    /// All activities on or after `from`.
    pub fn since(from: NaiveDate) -> Self {
        Self {
            from: Some(from),
            ..Self::default()
        }
    }

    pub fn matches(&self, activity: &Activity) -> bool {
        self.sport.as_deref().is_none_or(|s| activity.sport == s)
            && self.from.is_none_or(|d| activity.date >= d)
            && self.to.is_none_or(|d| activity.date <= d)
    }
}

/// Sort activities newest first, breaking date ties by descending ID.
pub fn sort_newest_first(activities: &mut [Activity]) {
    activities.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
}
