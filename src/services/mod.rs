// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity;
pub mod calories;
pub mod feed;

pub use activity::{ActivityRecorder, GpxImport, GpxSummary, ManualEntry};
pub use calories::estimate_calories;
pub use feed::{FeedAssembler, FeedDigest, FeedItem};
