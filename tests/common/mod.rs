// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use fitsocial::config::Config;
use fitsocial::db::{ActivityStore, FirestoreDb, MemoryDb, UserStore};
use fitsocial::middleware::auth::create_jwt;
use fitsocial::models::{Activity, NewActivity, NewUser, User};
use fitsocial::routes::create_router;
use fitsocial::AppState;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by an in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        db: Arc::new(MemoryDb::new()),
    });

    (create_router(state.clone()), state)
}

/// Session token for a user, signed with the test key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: u64) -> String {
    create_jwt(user_id, &Config::test_default().jwt_signing_key).expect("JWT creation failed")
}

/// Register a user directly in the store.
#[allow(dead_code)]
pub async fn create_user(state: &AppState, pseudo: &str) -> User {
    state
        .db
        .create_user(NewUser {
            pseudo: pseudo.to_string(),
            email: format!("{}@example.com", pseudo),
            first_name: pseudo.to_string(),
            last_name: "Test".to_string(),
            age: None,
            height_cm: None,
            weight_kg: None,
        })
        .await
        .expect("create user")
}

/// Store an activity directly.
#[allow(dead_code)]
pub async fn create_activity(
    state: &AppState,
    user_id: u64,
    sport: &str,
    date: chrono::NaiveDate,
    duration_seconds: i64,
    distance_meters: Option<f64>,
) -> Activity {
    state
        .db
        .create_activity(NewActivity {
            user_id,
            name: format!("{} on {}", sport, date),
            sport: sport.to_string(),
            date,
            duration_seconds: Some(duration_seconds),
            distance_meters,
            ..NewActivity::default()
        })
        .await
        .expect("create activity")
}

/// Send a request as `user_id` (or anonymously) and return the response.
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    user_id: Option<u64>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header(
            "Authorization",
            format!("Bearer {}", create_test_jwt(user_id)),
        );
    }

    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Send a request and assert on its status, returning the JSON body.
#[allow(dead_code)]
pub async fn expect_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    user_id: Option<u64>,
    body: Option<serde_json::Value>,
    status: StatusCode,
) -> serde_json::Value {
    let response = send(app, method, uri, user_id, body).await;
    assert_eq!(response.status(), status, "{} {}", method, uri);
    json_body(response).await
}
