// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Personal records per sport.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Activity;

/// A record value and the activity that set it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RecordEntry {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub value: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub activity_id: u64,
    pub activity_name: String,
    pub date: NaiveDate,
}

impl RecordEntry {
    fn new(value: u64, activity: &Activity) -> Self {
        Self {
            value,
            activity_id: activity.id,
            activity_name: activity.name.clone(),
            date: activity.date,
        }
    }

    /// Replace the record only on a strictly greater value, so ties keep
    /// whichever activity came first.
    fn challenge(&mut self, value: u64, activity: &Activity) {
        if value > self.value {
            *self = Self::new(value, activity);
        }
    }
}

/// Best duration, elevation gain and calories for one sport.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SportRecords {
    /// Longest activity, in seconds
    pub longest_duration: RecordEntry,
    /// Highest elevation gain, in meters
    pub max_elevation: RecordEntry,
    pub max_calories: RecordEntry,
}

impl SportRecords {
    fn seed(activity: &Activity) -> Self {
        Self {
            longest_duration: RecordEntry::new(activity.duration_secs(), activity),
            max_elevation: RecordEntry::new(activity.elevation_gain(), activity),
            max_calories: RecordEntry::new(activity.calories_burnt(), activity),
        }
    }

    fn challenge(&mut self, activity: &Activity) {
        self.longest_duration
            .challenge(activity.duration_secs(), activity);
        self.max_elevation
            .challenge(activity.elevation_gain(), activity);
        self.max_calories
            .challenge(activity.calories_burnt(), activity);
    }
}

/// Scan activities in input order and keep each sport's maxima.
///
/// A sport whose activities all lack a metric still gets a record of 0 for it.
pub fn personal_records(activities: &[Activity]) -> BTreeMap<String, SportRecords> {
    let mut records: BTreeMap<String, SportRecords> = BTreeMap::new();
    for activity in activities {
        match records.get_mut(&activity.sport) {
            Some(existing) => existing.challenge(activity),
            None => {
                records.insert(activity.sport.clone(), SportRecords::seed(activity));
            }
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::test_support::activity;

    #[test]
    fn test_elevation_tie_keeps_first_activity() {
        let mut first = activity(10, "Vélo", "2024-03-01", Some(3600), Some(20000.0));
        first.elevation_gain_meters = Some(500);
        let mut second = activity(11, "Vélo", "2024-03-08", Some(7200), Some(40000.0));
        second.elevation_gain_meters = Some(500);

        let records = personal_records(&[first, second]);
        let velo = &records["Vélo"];

        assert_eq!(velo.max_elevation.value, 500);
        assert_eq!(velo.max_elevation.activity_id, 10);
        assert_eq!(velo.longest_duration.activity_id, 11);
    }

    #[test]
    fn test_records_are_maximal() {
        let durations = [1200, 5400, 300, 5400, 4000];
        let activities: Vec<Activity> = durations
            .iter()
            .enumerate()
            .map(|(i, d)| activity(i as u64, "Course", "2024-01-01", Some(*d), None))
            .collect();

        let records = personal_records(&activities);
        let longest = &records["Course"].longest_duration;

        for a in &activities {
            assert!(longest.value >= a.duration_secs());
        }
        assert_eq!(longest.value, 5400);
        assert_eq!(longest.activity_id, 1);
        assert_eq!(longest.activity_name, "Activity 1");
    }

    #[test]
    fn test_null_metrics_still_produce_zero_records() {
        let activities = vec![activity(5, "Natation", "2024-05-05", None, None)];
        let records = personal_records(&activities);
        let natation = &records["Natation"];

        assert_eq!(natation.longest_duration.value, 0);
        assert_eq!(natation.max_elevation.value, 0);
        assert_eq!(natation.max_calories.value, 0);
        assert_eq!(natation.max_calories.activity_id, 5);
        assert_eq!(
            natation.max_calories.date,
            "2024-05-05".parse::<NaiveDate>().unwrap()
        );
    }

    #[test]
    fn test_sports_partitioned_by_exact_name() {
        let activities = vec![
            activity(1, "Course", "2024-01-01", Some(100), None),
            activity(2, "course", "2024-01-02", Some(200), None),
        ];
        let records = personal_records(&activities);

        assert_eq!(records.len(), 2);
        assert_eq!(records["Course"].longest_duration.value, 100);
        assert!(personal_records(&[]).is_empty());
    }
}
