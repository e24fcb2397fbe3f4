//! Heartbeat API Tests

use axum::http::StatusCode;
use chrono::{DateTime, TimeDelta, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{member, start_instant, TestApp};

async fn room_with_member(app: &TestApp) -> (String, String) {
    let user = app.register("device-a").await;
    let room = app.create_room(&user, None).await;
    (room, user)
}

#[tokio::test]
async fn test_heartbeat_returns_room_presence() {
    let app = TestApp::new().await;
    let (room, user) = room_with_member(&app).await;

    let response = app.heartbeat(&room, &user, Some("Editor"), false).await;

    response.assert_status_ok();
    let body: Value = response.json();
    let me = member(&body, &user);
    assert_eq!(me["activeApp"], "Editor");
    assert_eq!(me["isOnline"], true);
    assert_eq!(me["focusMode"], false);
    assert_eq!(app.store.activity().len(), 1);
}

#[tokio::test]
async fn test_non_member_heartbeat_is_rejected() {
    let app = TestApp::new().await;
    let (room, _) = room_with_member(&app).await;
    let outsider = app.register("device-b").await;

    let response = app.heartbeat(&room, &outsider, Some("Editor"), false).await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"], "not_member");
    assert_eq!(body["message"], "Not a member of this room");
    assert!(app.store.activity().is_empty());
}

#[tokio::test]
async fn test_focus_mode_hides_app_and_skips_log() {
    let app = TestApp::new().await;
    let (room, user) = room_with_member(&app).await;

    let response = app.heartbeat(&room, &user, Some("Game"), true).await;

    response.assert_status_ok();
    let body: Value = response.json();
    let me = member(&body, &user);
    assert_eq!(me["activeApp"], Value::Null);
    assert_eq!(me["focusMode"], true);
    assert_eq!(me["isOnline"], true);
    assert!(app.store.activity().is_empty());
}

#[tokio::test]
async fn test_null_focus_mode_counts_as_unfocused() {
    let app = TestApp::new().await;
    let (room, user) = room_with_member(&app).await;

    let response = app
        .server
        .post(&format!("/api/v1/rooms/{}/heartbeat", room))
        .json(&json!({ "userId": user, "activeApp": "Editor", "focusMode": null }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let me = member(&body, &user);
    assert_eq!(me["activeApp"], "Editor");
    assert_eq!(me["focusMode"], false);
    assert_eq!(app.store.activity().len(), 1);
}

#[tokio::test]
async fn test_idle_heartbeat_keeps_member_online_without_logging() {
    let app = TestApp::new().await;
    let (room, user) = room_with_member(&app).await;

    let response = app.heartbeat(&room, &user, None, false).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(member(&body, &user)["isOnline"], true);
    assert!(app.store.activity().is_empty());
}

#[tokio::test]
async fn test_blank_app_name_counts_as_idle() {
    let app = TestApp::new().await;
    let (room, user) = room_with_member(&app).await;

    let response = app.heartbeat(&room, &user, Some("   "), false).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(member(&body, &user)["activeApp"], Value::Null);
    assert!(app.store.activity().is_empty());
}

#[tokio::test]
async fn test_member_goes_offline_after_fifteen_seconds() {
    let app = TestApp::new().await;
    let (room, alice) = room_with_member(&app).await;
    let bob = app.register("device-b").await;
    app.join(&room, &bob, None).await.assert_status_ok();

    app.heartbeat(&room, &alice, Some("Editor"), false).await;

    app.clock.advance_secs(14);
    let body: Value = app.heartbeat(&room, &bob, None, false).await.json();
    assert_eq!(member(&body, &alice)["isOnline"], true);
    assert_eq!(member(&body, &alice)["activeApp"], "Editor");

    app.clock.advance_secs(1);
    let body: Value = app.heartbeat(&room, &bob, None, false).await.json();
    assert_eq!(member(&body, &alice)["isOnline"], false);
    assert_eq!(member(&body, &alice)["activeApp"], Value::Null);
}

#[tokio::test]
async fn test_late_older_heartbeat_keeps_newer_liveness() {
    let app = TestApp::new().await;
    let (room, user) = room_with_member(&app).await;

    app.clock.advance_secs(10);
    app.heartbeat(&room, &user, Some("Editor"), false)
        .await
        .assert_status_ok();

    // Stamped earlier but committed later
    app.clock.set(start_instant() + TimeDelta::seconds(5));
    let body: Value = app.heartbeat(&room, &user, Some("Game"), false).await.json();
    assert_eq!(member(&body, &user)["activeApp"], "Editor");

    let body: Value = app.server.get(&format!("/api/v1/rooms/{}", room)).await.json();
    let me = member(&body, &user);
    let last_seen: DateTime<Utc> = serde_json::from_value(me["lastSeen"].clone()).unwrap();
    assert_eq!(last_seen, start_instant() + TimeDelta::seconds(10));
    assert_eq!(me["activeApp"], "Editor");
    assert_eq!(app.store.activity().len(), 2);
}

#[tokio::test]
async fn test_member_without_heartbeat_is_offline() {
    let app = TestApp::new().await;
    let (room, alice) = room_with_member(&app).await;
    let bob = app.register("device-b").await;
    app.join(&room, &bob, None).await;

    let body: Value = app.heartbeat(&room, &alice, Some("Editor"), false).await.json();

    assert_eq!(member(&body, &bob)["isOnline"], false);
    assert_eq!(body["members"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_oversized_app_name_is_rejected() {
    let app = TestApp::new().await;
    let (room, user) = room_with_member(&app).await;
    let name = "x".repeat(256);

    let response = app.heartbeat(&room, &user, Some(&name), false).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "validation_error");
    assert!(app.store.activity().is_empty());
}

#[tokio::test]
async fn test_heartbeat_requires_user_id() {
    let app = TestApp::new().await;
    let (room, _) = room_with_member(&app).await;

    let response = app
        .server
        .post(&format!("/api/v1/rooms/{}/heartbeat", room))
        .json(&json!({ "activeApp": "Editor" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "validation_error");
}
