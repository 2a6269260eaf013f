// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! FitSocial: a social fitness tracker backend
//!
//! Users log workouts, follow each other, like and comment on activities,
//! and get weekly, per-sport, record and progression statistics along with
//! a feed of the activities of the people they follow.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod stats;
pub mod time_utils;

use config::Config;
use db::Database;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Database>,
}
