// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Statistics engine.
//!
//! Pure functions over an already-fetched list of activities. Nothing here
//! performs I/O or keeps state between calls, and no input is an error:
//! empty lists produce empty maps or zeroed values.
//!
//! Sport names are grouped by exact string match. "Vélo" and "vélo" are two
//! different sports as far as these aggregates are concerned.

pub mod progression;
pub mod records;
pub mod sport;
pub mod summary;
pub mod week;
pub mod weekly;

pub use progression::{analyze_progression, Progression};
pub use records::{personal_records, RecordEntry, SportRecords};
pub use sport::{aggregate_by_sport, SportAggregate};
pub use summary::{Dashboard, Summary};
pub use week::WeekKey;
pub use weekly::{WeeklyAggregate, WeeklyTotals};

/// Round to a fixed number of decimals for display.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
