// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Lifetime summary and dashboard KPIs.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Activity;
use crate::stats::sport::{aggregate_by_sport, favourite_sport};
use crate::stats::{round_to, WeeklyAggregate};
use crate::time_utils::weeks_ago;

/// Weeks considered when picking the favourite sport.
pub const FAVOURITE_SPORT_WEEKS: u32 = 12;

/// Totals over every activity a user has recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Summary {
    pub total_activities: usize,
    pub total_hours: f64,
    pub total_distance_km: f64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_calories: u64,
    /// Distinct sports, sorted
    pub sports: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_activity_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity_date: Option<NaiveDate>,
    /// Days between the first and last activity
    pub active_days_span: i64,
}

impl Summary {
    pub fn from_activities(activities: &[Activity]) -> Self {
        let total_seconds = activities
            .iter()
            .map(Activity::duration_secs)
            .fold(0u64, u64::saturating_add);
        let total_km: f64 = activities.iter().filter_map(Activity::distance_km).sum();
        let sports: BTreeSet<&str> = activities.iter().map(|a| a.sport.as_str()).collect();

        let first = activities.iter().map(|a| a.date).min();
        let last = activities.iter().map(|a| a.date).max();
        let active_days_span = match (first, last) {
            (Some(first), Some(last)) => (last - first).num_days(),
            _ => 0,
        };

        Self {
            total_activities: activities.len(),
            total_hours: round_to(total_seconds as f64 / 3600.0, 2),
            total_distance_km: round_to(total_km, 2),
            total_calories: activities
                .iter()
                .map(Activity::calories_burnt)
                .fold(0, u64::saturating_add),
            sports: sports.into_iter().map(str::to_string).collect(),
            first_activity_date: first,
            last_activity_date: last,
            active_days_span,
        }
    }
}

/// A metric over the last week, the last four weeks and all time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WindowedKpi<T> {
    pub last_week: T,
    pub last_4_weeks: T,
    pub total: T,
}

/// Headline numbers for a user's home page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Dashboard {
    #[cfg_attr(feature = "binding-generation", ts(type = "WindowedKpi<number>"))]
    pub activities: WindowedKpi<u32>,
    pub hours: WindowedKpi<f64>,
    pub km: WindowedKpi<f64>,
    /// Most practised sport over the last twelve weeks
    pub favourite_sport: Option<String>,
    pub last_activity_date: Option<NaiveDate>,
    pub active_days_span: i64,
}

impl Dashboard {
    /// Build the dashboard from a user's full history as of `today`.
    pub fn build(activities: &[Activity], today: NaiveDate) -> Self {
        let window = |weeks: u32| {
            let start = weeks_ago(today, weeks);
            let recent: Vec<Activity> = activities
                .iter()
                .filter(|a| a.date >= start)
                .cloned()
                .collect();
            WeeklyAggregate::from_activities(&recent).totals(weeks)
        };
        let last_week = window(1);
        let last_4_weeks = window(4);
        let summary = Summary::from_activities(activities);

        let favourite_start = weeks_ago(today, FAVOURITE_SPORT_WEEKS);
        let favourite_window: Vec<Activity> = activities
            .iter()
            .filter(|a| a.date >= favourite_start)
            .cloned()
            .collect();
        let favourite = favourite_sport(&aggregate_by_sport(&favourite_window)).map(str::to_string);

        Self {
            activities: WindowedKpi {
                last_week: last_week.total_activities,
                last_4_weeks: last_4_weeks.total_activities,
                total: summary.total_activities as u32,
            },
            hours: WindowedKpi {
                last_week: last_week.total_hours,
                last_4_weeks: last_4_weeks.total_hours,
                total: summary.total_hours,
            },
            km: WindowedKpi {
                last_week: last_week.total_km,
                last_4_weeks: last_4_weeks.total_km,
                total: summary.total_distance_km,
            },
            favourite_sport: favourite,
            last_activity_date: summary.last_activity_date,
            active_days_span: summary.active_days_span,
        }
    }
}
