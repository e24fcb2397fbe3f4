//! Room API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{member, TestApp};

#[tokio::test]
async fn test_create_room_enrolls_creator() {
    let app = TestApp::new().await;
    let user = app.register("device-a").await;

    let room = app.create_room(&user, None).await;

    assert_eq!(room.len(), 7);
    assert!(!room.chars().any(|c| "O0I1L".contains(c)));

    let response = app.server.get(&format!("/api/v1/rooms/{}", room)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["roomId"], room.as_str());
    assert!(body.get("id").is_none());
    assert_eq!(body["createdBy"], user.as_str());
    assert_eq!(body["hasPassword"], false);
    let creator = member(&body, &user);
    assert_eq!(creator["lastSeen"], Value::Null);
    assert_eq!(creator["isOnline"], false);
}

#[tokio::test]
async fn test_create_room_reports_password_without_hash() {
    let app = TestApp::new().await;
    let user = app.register("device-a").await;

    let response = app
        .server
        .post("/api/v1/rooms/create")
        .json(&json!({ "userId": user, "password": "hunter2" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["hasPassword"], true);

    let room = body["roomId"].as_str().unwrap();
    let details: Value = app.server.get(&format!("/api/v1/rooms/{}", room)).await.json();
    assert_eq!(details["hasPassword"], true);
    assert!(details.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_create_room_for_unknown_user() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/v1/rooms/create")
        .json(&json!({ "userId": "missing" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_join_and_rejoin() {
    let app = TestApp::new().await;
    let owner = app.register("device-a").await;
    let room = app.create_room(&owner, None).await;
    let guest = app.register("device-b").await;

    let first = app.join(&room, &guest, None).await;
    first.assert_status_ok();
    assert_eq!(first.json::<Value>()["message"], "Joined room successfully");

    let second = app.join(&room, &guest, None).await;
    second.assert_status_ok();
    assert_eq!(second.json::<Value>()["message"], "Already a member");
}

#[tokio::test]
async fn test_protected_room_requires_the_right_password() {
    let app = TestApp::new().await;
    let owner = app.register("device-a").await;
    let room = app.create_room(&owner, Some("hunter2")).await;
    let guest = app.register("device-b").await;

    let missing = app.join(&room, &guest, None).await;
    missing.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(missing.json::<Value>()["message"], "Invalid room password");

    app.join(&room, &guest, Some("wrong"))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.join(&room, &guest, Some("hunter2"))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_join_missing_room_or_user() {
    let app = TestApp::new().await;
    let owner = app.register("device-a").await;
    let room = app.create_room(&owner, None).await;

    app.join("ZZZZZZZ", &owner, None)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.join(&room, "missing", None)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_leave_is_idempotent() {
    let app = TestApp::new().await;
    let owner = app.register("device-a").await;
    let room = app.create_room(&owner, None).await;

    for _ in 0..2 {
        let response = app
            .server
            .post(&format!("/api/v1/rooms/{}/leave", room))
            .json(&json!({ "userId": owner }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["message"], "Left room successfully");
    }

    let body: Value = app.server.get(&format!("/api/v1/rooms/{}", room)).await.json();
    assert_eq!(body["members"], json!([]));

    app.heartbeat(&room, &owner, Some("Editor"), false)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_get_missing_room() {
    let app = TestApp::new().await;

    let response = app.server.get("/api/v1/rooms/ZZZZZZZ").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "Room not found");
}

#[tokio::test]
async fn test_room_view_shows_last_seen_after_heartbeat() {
    let app = TestApp::new().await;
    let owner = app.register("device-a").await;
    let room = app.create_room(&owner, None).await;
    app.heartbeat(&room, &owner, Some("Editor"), false).await;

    let body: Value = app.server.get(&format!("/api/v1/rooms/{}", room)).await.json();

    let me = member(&body, &owner);
    assert!(me["lastSeen"].is_string());
    assert_eq!(me["activeApp"], "Editor");
    assert_eq!(me["isOnline"], true);
}

#[tokio::test]
async fn test_debug_page_shows_live_members() {
    let app = TestApp::new().await;
    let owner = app.register("device-a").await;
    let room = app.create_room(&owner, None).await;
    app.heartbeat(&room, &owner, Some("Editor"), false).await;

    let response = app.server.get(&format!("/debug/{}", room)).await;

    response.assert_status_ok();
    let page = response.text();
    assert!(page.contains(&room));
    assert!(page.contains("Members (1)"));
    assert!(page.contains("ONLINE"));
    assert!(page.contains(">Editor<"));

    app.server
        .get("/debug/NOROOM2")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
