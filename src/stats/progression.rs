// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Progression of one sport's per-activity metrics over a window.
//!
//! The sample is ordered by date and split in two halves; the means of the
//! later half are compared to those of the earlier half.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Activity;

/// One activity in the progression series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProgressionPoint {
    pub date: NaiveDate,
    pub duration_min: f64,
    pub distance_km: f64,
    pub calories: f64,
}

impl From<&Activity> for ProgressionPoint {
    fn from(activity: &Activity) -> Self {
        Self {
            date: activity.date,
            duration_min: activity.duration_secs() as f64 / 60.0,
            distance_km: activity.distance_km().unwrap_or(0.0),
            calories: activity.calories_burnt() as f64,
        }
    }
}

/// Mean metrics over one half of the sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PeriodMeans {
    pub duration_min: f64,
    pub distance_km: f64,
    pub calories: f64,
}

impl PeriodMeans {
    fn of(points: &[ProgressionPoint]) -> Self {
        Self {
            duration_min: positive_mean(points.iter().map(|p| p.duration_min)),
            distance_km: positive_mean(points.iter().map(|p| p.distance_km)),
            calories: positive_mean(points.iter().map(|p| p.calories)),
        }
    }
}

/// Mean of the strictly positive values, 0 when there are none.
///
/// Zero stands for "not recorded", so it must not drag the mean down.
fn positive_mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .filter(|v| *v > 0.0)
        .fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Relative change rendered with an explicit sign and one decimal, e.g.
/// `"+15.6%"`. A zero baseline has no defined change and renders as `"N/A"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignedPercent(pub Option<f64>);

impl SignedPercent {
    pub fn between(early: f64, late: f64) -> Self {
        if early > 0.0 {
            Self(Some((late - early) / early * 100.0))
        } else {
            Self(None)
        }
    }
}

impl std::fmt::Display for SignedPercent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{:+.1}%", value),
            None => f.write_str("N/A"),
        }
    }
}

impl Serialize for SignedPercent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Change of each mean from the early half to the late half.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PercentChange {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub duration: SignedPercent,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub distance: SignedPercent,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub calories: SignedPercent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Progression {
    pub sport: String,
    pub window_weeks: u32,
    pub count: usize,
    /// Chronological series, one point per activity
    pub points: Vec<ProgressionPoint>,
    pub mean_early: PeriodMeans,
    pub mean_late: PeriodMeans,
    /// Absent when fewer than two activities are available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_change: Option<PercentChange>,
}

/// Compare early and late halves of the given sport's activities.
///
/// Activities of other sports are ignored. The first `floor(n/2)` activities
/// by date form the early half, the rest the late half; equal dates keep
/// their input order.
pub fn analyze_progression(sport: &str, activities: &[Activity], window_weeks: u32) -> Progression {
    let mut matching: Vec<&Activity> = activities.iter().filter(|a| a.sport == sport).collect();
    matching.sort_by_key(|a| a.date);

    let points: Vec<ProgressionPoint> = matching.into_iter().map(ProgressionPoint::from).collect();
    let (early, late) = points.split_at(points.len() / 2);
    let mean_early = PeriodMeans::of(early);
    let mean_late = PeriodMeans::of(late);

    let percent_change = (points.len() >= 2).then(|| PercentChange {
        duration: SignedPercent::between(mean_early.duration_min, mean_late.duration_min),
        distance: SignedPercent::between(mean_early.distance_km, mean_late.distance_km),
        calories: SignedPercent::between(mean_early.calories, mean_late.calories),
    });

    Progression {
        sport: sport.to_string(),
        window_weeks,
        count: points.len(),
        points,
        mean_early,
        mean_late,
        percent_change,
    }
}
