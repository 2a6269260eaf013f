// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Follow, activity, like and comment endpoint tests.

use axum::http::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn test_follow_flow() {
    let (app, state) = common::create_test_app();
    let alice = common::create_user(&state, "alice").await;
    let bob = common::create_user(&state, "bob").await;

    let uri = format!("/api/users/{}/follow", bob.id);
    let body = common::expect_json(&app, "POST", &uri, Some(alice.id), None, StatusCode::OK).await;
    assert_eq!(body["following"], true);
    assert_eq!(body["followers_count"], 1);
    assert_eq!(body["following_count"], 1);

    // Following twice changes nothing.
    let body = common::expect_json(&app, "POST", &uri, Some(alice.id), None, StatusCode::OK).await;
    assert_eq!(body["followers_count"], 1);

    let followers = common::expect_json(
        &app,
        "GET",
        &format!("/api/users/{}/followers", bob.id),
        Some(alice.id),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(followers[0]["pseudo"], "alice");
    assert!(followers[0].get("email").is_none());

    let profile = common::expect_json(
        &app,
        "GET",
        &format!("/api/users/{}", bob.id),
        Some(alice.id),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(profile["pseudo"], "bob");
    assert_eq!(profile["followers_count"], 1);
    assert_eq!(profile["followed_by_me"], true);

    let body =
        common::expect_json(&app, "DELETE", &uri, Some(alice.id), None, StatusCode::OK).await;
    assert_eq!(body["following"], false);
    assert_eq!(body["followers_count"], 0);

    // Unfollowing twice is also a no-op.
    common::expect_json(&app, "DELETE", &uri, Some(alice.id), None, StatusCode::OK).await;
}

#[tokio::test]
async fn test_follow_rejects_self_and_unknown() {
    let (app, state) = common::create_test_app();
    let alice = common::create_user(&state, "alice").await;

    let response = common::send(
        &app,
        "POST",
        &format!("/api/users/{}/follow", alice.id),
        Some(alice.id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = common::send(&app, "POST", "/api/users/987654/follow", Some(alice.id), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_users_by_pseudo_prefix() {
    let (app, state) = common::create_test_app();
    let me = common::create_user(&state, "me").await;
    common::create_user(&state, "runner_bob").await;
    common::create_user(&state, "runner_ann").await;
    common::create_user(&state, "cyclist").await;

    let body = common::expect_json(
        &app,
        "GET",
        "/api/users?search=runner",
        Some(me.id),
        None,
        StatusCode::OK,
    )
    .await;

    let pseudos: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["pseudo"].as_str().unwrap())
        .collect();
    assert_eq!(pseudos, vec!["runner_ann", "runner_bob"]);

    let body = common::expect_json(
        &app,
        "GET",
        "/api/users?search=runner&limit=1",
        Some(me.id),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_activity_lifecycle() {
    let (app, state) = common::create_test_app();
    let owner = common::create_user(&state, "owner").await;
    let other = common::create_user(&state, "other").await;

    let created = common::expect_json(
        &app,
        "POST",
        "/api/activities",
        Some(owner.id),
        Some(json!({
            "name": "Morning run",
            "sport": "Course",
            "date": "2024-06-01",
            "duration_seconds": 2700,
            "distance_meters": 8000.0
        })),
        StatusCode::CREATED,
    )
    .await;
    let id = created["id"].as_u64().unwrap();
    assert_eq!(created["user_id"], owner.id);
    let uri = format!("/api/activities/{}", id);

    let detail = common::expect_json(&app, "GET", &uri, Some(other.id), None, StatusCode::OK).await;
    assert_eq!(detail["name"], "Morning run");
    assert_eq!(detail["like_count"], 0);

    // Only the owner may edit or delete.
    let response = common::send(
        &app,
        "PUT",
        &uri,
        Some(other.id),
        Some(json!({"name": "Hijacked"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = common::send(&app, "DELETE", &uri, Some(other.id), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = common::send(&app, "PUT", &uri, Some(owner.id), Some(json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let updated = common::expect_json(
        &app,
        "PUT",
        &uri,
        Some(owner.id),
        Some(json!({"sport": "Trail", "description": "Muddy"})),
        StatusCode::OK,
    )
    .await;
    assert_eq!(updated["sport"], "Trail");
    assert_eq!(updated["description"], "Muddy");
    assert_eq!(updated["name"], "Morning run");
    assert_eq!(updated["duration_seconds"], 2700);

    let response = common::send(&app, "DELETE", &uri, Some(owner.id), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = common::send(&app, "GET", &uri, Some(owner.id), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_gpx_import_estimates_calories() {
    let (app, state) = common::create_test_app();
    let hiker = common::create_user(&state, "hiker").await;

    let created = common::expect_json(
        &app,
        "POST",
        "/api/activities/import",
        Some(hiker.id),
        Some(json!({
            "name": "Ridge walk",
            "sport": "Randonnée",
            "gpx_reference": "uploads/ridge.gpx",
            "summary": {
                "start_date": "2024-05-01T08:00:00Z",
                "duration_seconds": 7200,
                "elevation_gain": 500.0,
                "point_count": 1200
            }
        })),
        StatusCode::CREATED,
    )
    .await;

    assert_eq!(created["date"], "2024-05-01");
    assert_eq!(created["duration_seconds"], 7200);
    // 400 kcal/h for two hours plus 0.1 kcal per meter climbed.
    assert_eq!(created["calories"], 850);
    assert_eq!(created["gpx_reference"], "uploads/ridge.gpx");
}

#[tokio::test]
async fn test_list_activities_with_filters() {
    let (app, state) = common::create_test_app();
    let user = common::create_user(&state, "filters").await;

    for (sport, date) in [
        ("Course", "2024-01-05"),
        ("Vélo", "2024-01-10"),
        ("Course", "2024-01-15"),
        ("Course", "2024-02-01"),
    ] {
        common::create_activity(&state, user.id, sport, date.parse().unwrap(), 1800, None).await;
    }

    let body = common::expect_json(
        &app,
        "GET",
        &format!(
            "/api/users/{}/activities?sport=Course&from=2024-01-01&to=2024-01-31",
            user.id
        ),
        Some(user.id),
        None,
        StatusCode::OK,
    )
    .await;
    let dates: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-01-15", "2024-01-05"]);

    let sports = common::expect_json(
        &app,
        "GET",
        &format!("/api/users/{}/sports", user.id),
        Some(user.id),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(sports, json!(["Course", "Vélo"]));
}

#[tokio::test]
async fn test_likes_are_idempotent() {
    let (app, state) = common::create_test_app();
    let owner = common::create_user(&state, "owner").await;
    let fan = common::create_user(&state, "fan").await;
    let activity =
        common::create_activity(&state, owner.id, "Natation", "2024-03-03".parse().unwrap(), 1800, None)
            .await;

    let uri = format!("/api/activities/{}/like", activity.id);
    for _ in 0..2 {
        let body = common::expect_json(&app, "POST", &uri, Some(fan.id), None, StatusCode::OK).await;
        assert_eq!(body["liked"], true);
        assert_eq!(body["like_count"], 1);
    }

    let likers = common::expect_json(
        &app,
        "GET",
        &format!("/api/activities/{}/likes", activity.id),
        Some(owner.id),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(likers[0]["pseudo"], "fan");

    let detail = common::expect_json(
        &app,
        "GET",
        &format!("/api/activities/{}", activity.id),
        Some(fan.id),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(detail["liked_by_me"], true);

    for _ in 0..2 {
        let body =
            common::expect_json(&app, "DELETE", &uri, Some(fan.id), None, StatusCode::OK).await;
        assert_eq!(body["liked"], false);
        assert_eq!(body["like_count"], 0);
    }

    let response = common::send(&app, "POST", "/api/activities/5555/like", Some(fan.id), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comment_flow() {
    let (app, state) = common::create_test_app();
    let owner = common::create_user(&state, "owner").await;
    let friend = common::create_user(&state, "friend").await;
    let activity =
        common::create_activity(&state, owner.id, "Course", "2024-03-03".parse().unwrap(), 1800, None)
            .await;
    let comments_uri = format!("/api/activities/{}/comments", activity.id);

    let response = common::send(
        &app,
        "POST",
        &comments_uri,
        Some(friend.id),
        Some(json!({"content": "   "})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let created = common::expect_json(
        &app,
        "POST",
        &comments_uri,
        Some(friend.id),
        Some(json!({"content": "  Great pace!  "})),
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(created["content"], "Great pace!");
    assert_eq!(created["author"]["pseudo"], "friend");
    let comment_uri = format!("/api/comments/{}", created["id"].as_u64().unwrap());

    // Only the author may edit or delete.
    let response = common::send(
        &app,
        "PUT",
        &comment_uri,
        Some(owner.id),
        Some(json!({"content": "Edited by owner"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let edited = common::expect_json(
        &app,
        "PUT",
        &comment_uri,
        Some(friend.id),
        Some(json!({"content": "Great pace, again!"})),
        StatusCode::OK,
    )
    .await;
    assert_eq!(edited["content"], "Great pace, again!");

    let listed =
        common::expect_json(&app, "GET", &comments_uri, Some(owner.id), None, StatusCode::OK).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["content"], "Great pace, again!");

    let response = common::send(&app, "DELETE", &comment_uri, Some(owner.id), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = common::send(&app, "DELETE", &comment_uri, Some(friend.id), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let listed =
        common::expect_json(&app, "GET", &comments_uri, Some(owner.id), None, StatusCode::OK).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_activity_removes_engagement() {
    let (app, state) = common::create_test_app();
    let owner = common::create_user(&state, "owner").await;
    let friend = common::create_user(&state, "friend").await;
    let activity =
        common::create_activity(&state, owner.id, "Course", "2024-03-03".parse().unwrap(), 1800, None)
            .await;

    common::send(
        &app,
        "POST",
        &format!("/api/activities/{}/like", activity.id),
        Some(friend.id),
        None,
    )
    .await;
    let comment = common::expect_json(
        &app,
        "POST",
        &format!("/api/activities/{}/comments", activity.id),
        Some(friend.id),
        Some(json!({"content": "Nice"})),
        StatusCode::CREATED,
    )
    .await;

    let response = common::send(
        &app,
        "DELETE",
        &format!("/api/activities/{}", activity.id),
        Some(owner.id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = common::send(
        &app,
        "PUT",
        &format!("/api/comments/{}", comment["id"].as_u64().unwrap()),
        Some(friend.id),
        Some(json!({"content": "Still here?"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
