// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Per-week activity rollups.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::Activity;
use crate::stats::{round_to, WeekKey};

/// Activities bucketed by ISO week.
///
/// The three maps are sparse: a week with no activity has no key. The
/// distance map additionally skips weeks where no activity carried a distance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeeklyAggregate {
    /// Activity count per week and sport
    pub counts: BTreeMap<WeekKey, BTreeMap<String, u32>>,
    /// Hours of activity per week
    pub hours: BTreeMap<WeekKey, f64>,
    /// Kilometers per week
    pub distance_km: BTreeMap<WeekKey, f64>,
}

impl WeeklyAggregate {
    /// Bucket every activity under its own week. Callers pick the window.
    pub fn from_activities(activities: &[Activity]) -> Self {
        let mut aggregate = Self::default();
        for activity in activities {
            aggregate.add(activity);
        }
        aggregate
    }

    /// Add one activity to its week's buckets.
    pub fn add(&mut self, activity: &Activity) {
        let week = WeekKey::from_date(activity.date);

        *self
            .counts
            .entry(week)
            .or_default()
            .entry(activity.sport.clone())
            .or_insert(0) += 1;

        // Missing durations still open the week's hour bucket.
        *self.hours.entry(week).or_insert(0.0) += activity.duration_secs() as f64 / 3600.0;

        if let Some(km) = activity.distance_km() {
            *self.distance_km.entry(week).or_insert(0.0) += km;
        }
    }

    pub fn total_activities(&self) -> u32 {
        self.counts.values().flat_map(|sports| sports.values()).sum()
    }

    /// Totals over the window and per-week means.
    ///
    /// Means divide by the window length, not by the number of active weeks,
    /// and are 0 for an empty window.
    pub fn totals(&self, window_weeks: u32) -> WeeklyTotals {
        let total_activities = self.total_activities();
        let total_hours: f64 = self.hours.values().sum();
        let total_km: f64 = self.distance_km.values().sum();

        let per_week = |total: f64| {
            if window_weeks > 0 {
                round_to(total / window_weeks as f64, 1)
            } else {
                0.0
            }
        };

        WeeklyTotals {
            total_activities,
            total_hours: round_to(total_hours, 1),
            total_km: round_to(total_km, 1),
            avg_activities_per_week: per_week(total_activities as f64),
            avg_hours_per_week: per_week(total_hours),
            avg_km_per_week: per_week(total_km),
        }
    }
}

/// Window totals derived from a [`WeeklyAggregate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WeeklyTotals {
    pub total_activities: u32,
    pub total_hours: f64,
    pub total_km: f64,
    pub avg_activities_per_week: f64,
    pub avg_hours_per_week: f64,
    pub avg_km_per_week: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::test_support::activity;

    fn key(s: &str) -> WeekKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_counts_by_week_and_sport() {
        let activities = vec![
            activity(1, "Course", "2024-01-01", Some(1800), Some(5000.0)),
            activity(2, "Course", "2024-01-03", Some(3600), Some(10000.0)),
            activity(3, "Vélo", "2024-01-07", Some(7200), Some(40000.0)),
            activity(4, "Course", "2024-01-08", Some(1800), None),
        ];

        let weekly = WeeklyAggregate::from_activities(&activities);

        let w1 = &weekly.counts[&key("2024-W01")];
        assert_eq!(w1.get("Course"), Some(&2));
        assert_eq!(w1.get("Vélo"), Some(&1));
        assert_eq!(weekly.counts[&key("2024-W02")].get("Course"), Some(&1));

        assert_eq!(weekly.hours[&key("2024-W01")], 3.5);
        assert_eq!(weekly.distance_km[&key("2024-W01")], 55.0);
    }

    #[test]
    fn test_year_boundary_bucket() {
        let activities = vec![activity(1, "Course", "2024-12-30", Some(3600), None)];
        let weekly = WeeklyAggregate::from_activities(&activities);

        let keys: Vec<String> = weekly.counts.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["2025-W01"]);
        // ISO 2024 has 52 weeks.
        assert!("2024-W53".parse::<WeekKey>().is_err());
    }

    #[test]
    fn test_missing_duration_opens_hours_bucket_but_missing_distance_does_not() {
        let activities = vec![activity(1, "Yoga", "2024-02-05", None, None)];
        let weekly = WeeklyAggregate::from_activities(&activities);
        let week = key("2024-W06");

        assert_eq!(weekly.hours.get(&week), Some(&0.0));
        assert_eq!(weekly.distance_km.get(&week), None);
        assert_eq!(weekly.counts[&week].get("Yoga"), Some(&1));
    }

    #[test]
    fn test_count_sum_matches_input_length() {
        let activities: Vec<Activity> = (0..40)
            .map(|i| {
                let date = chrono::NaiveDate::from_ymd_opt(2023, 11, 1).unwrap()
                    + chrono::Duration::days(i * 3);
                let sport = if i % 3 == 0 { "Vélo" } else { "Course" };
                activity(i as u64, sport, &date.to_string(), Some(600), None)
            })
            .collect();

        let weekly = WeeklyAggregate::from_activities(&activities);
        assert_eq!(weekly.total_activities() as usize, activities.len());
    }

    #[test]
    fn test_sparse_weeks_are_absent() {
        let activities = vec![
            activity(1, "Course", "2024-01-01", Some(600), None),
            activity(2, "Course", "2024-01-22", Some(600), None),
        ];
        let weekly = WeeklyAggregate::from_activities(&activities);

        assert_eq!(weekly.counts.len(), 2);
        assert!(!weekly.counts.contains_key(&key("2024-W02")));
        assert!(!weekly.hours.contains_key(&key("2024-W03")));
    }

    #[test]
    fn test_totals_divide_by_window() {
        let activities = vec![
            activity(1, "Course", "2024-01-01", Some(3600), Some(10000.0)),
            activity(2, "Course", "2024-01-10", Some(5400), Some(15000.0)),
            activity(3, "Vélo", "2024-01-20", Some(7200), None),
        ];
        let totals = WeeklyAggregate::from_activities(&activities).totals(4);

        assert_eq!(totals.total_activities, 3);
        assert_eq!(totals.total_hours, 4.5);
        assert_eq!(totals.total_km, 25.0);
        assert_eq!(totals.avg_activities_per_week, 0.8);
        assert_eq!(totals.avg_hours_per_week, 1.1);
        assert_eq!(totals.avg_km_per_week, 6.3);
    }

    #[test]
    fn test_empty_input_and_zero_window() {
        let weekly = WeeklyAggregate::from_activities(&[]);
        assert!(weekly.counts.is_empty());

        let totals = weekly.totals(0);
        assert_eq!(totals, WeeklyTotals::default());
    }
}
