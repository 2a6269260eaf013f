// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calorie estimation for imported activities.
//!
//! A flat hourly rate per sport plus a climbing bonus of 1 kcal per 10 m of
//! elevation gain.

/// Hourly rate for sports missing from [`SPORT_RATES`].
pub const DEFAULT_KCAL_PER_HOUR: f64 = 400.0;

/// Hourly rates keyed by folded sport name (lowercase, accents stripped).
const SPORT_RATES: &[(&str, f64)] = &[
    ("marche", 300.0),
    ("walk", 300.0),
    ("course", 600.0),
    ("run", 600.0),
    ("velo", 500.0),
    ("ride", 500.0),
    ("natation", 500.0),
    ("swim", 500.0),
    ("randonnee", 400.0),
    ("hike", 400.0),
];

/// Lowercase and strip the diacritics found in French sport names.
fn fold_sport(sport: &str) -> String {
    sport
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Hourly burn rate for a sport.
pub fn kcal_per_hour(sport: &str) -> f64 {
    let folded = fold_sport(sport);
    SPORT_RATES
        .iter()
        .find(|(name, _)| *name == folded)
        .map(|(_, rate)| *rate)
        .unwrap_or(DEFAULT_KCAL_PER_HOUR)
}

/// Estimated calories, truncated to a whole number.
pub fn estimate_calories(sport: &str, hours: f64, elevation_gain_m: f64) -> i64 {
    let hours = hours.max(0.0);
    let elevation = elevation_gain_m.max(0.0);
    (kcal_per_hour(sport) * hours + elevation * 0.1) as i64
}
