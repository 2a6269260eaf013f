// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod social;
pub mod user;

pub use activity::{
    sort_newest_first, Activity, ActivityFilter, ActivityUpdate, NewActivity, MAX_CALORIES,
    MAX_DISTANCE_METERS, MAX_DURATION_SECONDS, MAX_ELEVATION_METERS,
};
pub use social::{normalize_comment, Comment, FollowEdge, LikeEdge, NewComment};
pub use user::{NewUser, PublicUser, User};
