// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! ISO-8601 week keys.
//!
//! Weeks start on Monday and week 1 of a year is the week holding that year's
//! first Thursday, so late-December dates can belong to week 1 of the next
//! year and early-January dates to week 52/53 of the previous one.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An `(ISO year, ISO week)` bucket, formatted as `"2024-W01"`.
///
/// Ordering is chronological, and so is the lexicographic order of the
/// formatted keys thanks to the zero-padded week number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey {
    year: i32,
    week: u32,
}

impl WeekKey {
    /// Bucket a calendar date into its ISO week.
    pub fn from_date(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// Build a key, rejecting weeks that do not exist in that ISO year.
    pub fn new(year: i32, week: u32) -> Option<Self> {
        NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).map(|_| Self { year, week })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    /// Monday opening this week.
    pub fn monday(&self) -> NaiveDate {
        // Keys are only built from real dates or validated by `new`.
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon).unwrap_or_default()
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("Invalid ISO week key: {0}")]
pub struct WeekKeyError(String);

impl FromStr for WeekKey {
    type Err = WeekKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WeekKeyError(s.to_string());
        let (year, week) = s.split_once("-W").ok_or_else(invalid)?;
        if week.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let week = week.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, week).ok_or_else(invalid)
    }
}

impl Serialize for WeekKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WeekKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(date: &str) -> String {
        WeekKey::from_date(date.parse().unwrap()).to_string()
    }

    #[test]
    fn test_year_end_dates_roll_into_next_iso_year() {
        // 2024-12-30 is a Monday opening ISO week 1 of 2025.
        assert_eq!(key("2024-12-30"), "2025-W01");
        assert_eq!(key("2024-12-31"), "2025-W01");
        assert_eq!(key("2024-12-29"), "2024-W52");
    }

    #[test]
    fn test_early_january_can_belong_to_previous_year() {
        // 2021-01-03 is a Sunday still in ISO week 53 of 2020.
        assert_eq!(key("2021-01-03"), "2020-W53");
        assert_eq!(key("2021-01-04"), "2021-W01");
        // 2023-01-01 is a Sunday in week 52 of 2022.
        assert_eq!(key("2023-01-01"), "2022-W52");
    }

    #[test]
    fn test_week_boundaries_are_monday_to_sunday() {
        assert_eq!(key("2024-01-01"), "2024-W01");
        assert_eq!(key("2024-01-07"), "2024-W01");
        assert_eq!(key("2024-01-08"), "2024-W02");
    }

    #[test]
    fn test_key_order_matches_string_order() {
        let mut keys: Vec<WeekKey> = ["2024-03-04", "2023-12-31", "2024-01-08", "2024-12-30"]
            .iter()
            .map(|d| WeekKey::from_date(d.parse().unwrap()))
            .collect();
        keys.sort();

        let as_strings: Vec<String> = keys.iter().map(ToString::to_string).collect();
        let mut sorted_strings = as_strings.clone();
        sorted_strings.sort();
        assert_eq!(as_strings, sorted_strings);
        assert_eq!(as_strings[0], "2023-W52");
        assert_eq!(as_strings[3], "2025-W01");
    }

    #[test]
    fn test_parse_round_trips_and_rejects_garbage() {
        let parsed: WeekKey = "2020-W53".parse().unwrap();
        assert_eq!((parsed.year(), parsed.week()), (2020, 53));
        assert_eq!(parsed.monday(), "2020-12-28".parse::<NaiveDate>().unwrap());

        assert!("2021-W53".parse::<WeekKey>().is_err()); // 2021 has 52 weeks
        assert!("2024-W1".parse::<WeekKey>().is_err());
        assert!("2024W01".parse::<WeekKey>().is_err());
        assert!("semaine_2024-W01".parse::<WeekKey>().is_err());
    }

    #[test]
    fn test_serializes_as_json_string_and_map_key() {
        let key = WeekKey::new(2024, 1).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2024-W01\"");

        let mut map = std::collections::BTreeMap::new();
        map.insert(key, 3u32);
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"2024-W01":3}"#);
    }
}
