// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Per-sport totals.

use serde::Serialize;
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Activity;

/// Totals for one sport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SportAggregate {
    pub count: u32,
    pub total_hours: f64,
    pub total_distance_km: f64,
    /// Elevation only counts for activities that also carry a distance
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_elevation: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_calories: u64,
}

impl SportAggregate {
    fn add(&mut self, activity: &Activity) {
        self.count += 1;
        self.total_hours += activity.duration_secs() as f64 / 3600.0;
        self.total_calories = self.total_calories.saturating_add(activity.calories_burnt());

        if let Some(km) = activity.distance_km() {
            self.total_distance_km += km;
            self.total_elevation = self.total_elevation.saturating_add(activity.elevation_gain());
        }
    }
}

/// Group activities by their stored sport string.
pub fn aggregate_by_sport(activities: &[Activity]) -> BTreeMap<String, SportAggregate> {
    let mut by_sport: BTreeMap<String, SportAggregate> = BTreeMap::new();
    for activity in activities {
        by_sport
            .entry(activity.sport.clone())
            .or_default()
            .add(activity);
    }
    by_sport
}

/// Sport with the most activities. Ties go to the alphabetically first sport.
pub fn favourite_sport(by_sport: &BTreeMap<String, SportAggregate>) -> Option<&str> {
    let mut best: Option<(&str, u32)> = None;
    for (sport, aggregate) in by_sport {
        if best.is_none_or(|(_, count)| aggregate.count > count) {
            best = Some((sport, aggregate.count));
        }
    }
    best.map(|(sport, _)| sport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::test_support::activity;

    #[test]
    fn test_course_totals() {
        let activities = vec![
            activity(1, "Course", "2024-01-01", Some(1800), None),
            activity(2, "Course", "2024-01-05", Some(3600), None),
            activity(3, "Course", "2024-01-09", Some(5400), None),
        ];

        let by_sport = aggregate_by_sport(&activities);
        let course = by_sport["Course"];

        assert_eq!(course.count, 3);
        // 10800 seconds in total.
        assert_eq!(course.total_hours, 3.0);
    }

    #[test]
    fn test_sport_keys_are_case_sensitive() {
        let activities = vec![
            activity(1, "Vélo", "2024-01-01", Some(3600), None),
            activity(2, "vélo", "2024-01-02", Some(3600), None),
            activity(3, "velo", "2024-01-03", Some(3600), None),
        ];

        let by_sport = aggregate_by_sport(&activities);
        assert_eq!(by_sport.len(), 3);
        assert_eq!(by_sport["Vélo"].count, 1);
    }

    #[test]
    fn test_elevation_requires_distance() {
        let mut with_distance = activity(1, "Vélo", "2024-01-01", Some(3600), Some(30000.0));
        with_distance.elevation_gain_meters = Some(400);
        with_distance.calories = Some(800);

        let mut without_distance = activity(2, "Vélo", "2024-01-02", None, None);
        without_distance.elevation_gain_meters = Some(900);
        without_distance.calories = Some(200);

        let velo = aggregate_by_sport(&[with_distance, without_distance])["Vélo"];

        assert_eq!(velo.count, 2);
        assert_eq!(velo.total_distance_km, 30.0);
        assert_eq!(velo.total_elevation, 400);
        assert_eq!(velo.total_calories, 1000);
        assert_eq!(velo.total_hours, 1.0);
    }

    #[test]
    fn test_totals_saturate() {
        let activities: Vec<Activity> = (1..=3)
            .map(|id| {
                let mut a = activity(id, "Course", "2024-01-01", None, Some(1000.0));
                a.calories = Some(i64::MAX);
                a.elevation_gain_meters = Some(i64::MAX);
                a
            })
            .collect();

        let course = aggregate_by_sport(&activities)["Course"];
        assert_eq!(course.count, 3);
        assert_eq!(course.total_calories, u64::MAX);
        assert_eq!(course.total_elevation, u64::MAX);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_by_sport(&[]).is_empty());
        assert_eq!(favourite_sport(&BTreeMap::new()), None);
    }

    #[test]
    fn test_favourite_sport_tie_break() {
        let activities = vec![
            activity(1, "Vélo", "2024-01-01", None, None),
            activity(2, "Course", "2024-01-02", None, None),
            activity(3, "Vélo", "2024-01-03", None, None),
            activity(4, "Course", "2024-01-04", None, None),
        ];
        let by_sport = aggregate_by_sport(&activities);
        assert_eq!(favourite_sport(&by_sport), Some("Course"));
    }
}
