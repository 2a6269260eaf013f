// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration and session routes.

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidationError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, SESSION_COOKIE};
use crate::models::NewUser;
use crate::routes::api::UserResponse;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/logout", get(logout).post(logout))
}

fn validate_pseudo(pseudo: &str) -> std::result::Result<(), ValidationError> {
    if pseudo
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        Ok(())
    } else {
        Err(ValidationError::new("pseudo_charset"))
    }
}

/// New account request.
#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 30), custom(function = "validate_pseudo"))]
    pub pseudo: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[serde(default)]
    #[validate(range(min = 1, max = 130))]
    pub age: Option<u32>,
    #[serde(default)]
    #[validate(range(min = 50.0, max = 300.0))]
    pub height_cm: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 20.0, max = 500.0))]
    pub weight_kg: Option<f64>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RegisterResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Create an account and open a session for it.
///
/// The session token is both returned in the body and set as an HTTP-only
/// cookie.
async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> Result<(CookieJar, (StatusCode, Json<RegisterResponse>))> {
    request.validate()?;

    let user = state
        .db
        .create_user(NewUser {
            pseudo: request.pseudo,
            email: request.email.to_lowercase(),
            first_name: request.first_name,
            last_name: request.last_name,
            age: request.age,
            height_cm: request.height_cm,
            weight_kg: request.weight_kg,
        })
        .await?;

    let token = create_jwt(user.id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(user_id = user.id, pseudo = %user.pseudo, "User registered");

    Ok((
        jar.add(session_cookie(&state.config, token.clone())),
        (
            StatusCode::CREATED,
            Json(RegisterResponse {
                token,
                user: UserResponse::from(user),
            }),
        ),
    ))
}

/// Session cookie carrying `value`. Marked `Secure` unless the frontend is
/// served over plain HTTP (local development).
fn session_cookie(config: &Config, value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(config.frontend_url.starts_with("https://"))
        .same_site(SameSite::Lax)
        .build()
}

/// Clear the session cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, StatusCode) {
    (
        jar.remove(session_cookie(&state.config, String::new())),
        StatusCode::NO_CONTENT,
    )
}
