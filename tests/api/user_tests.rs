//! User API Tests

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use room_presence::domain::ANONYMOUS_PREFIX;

use crate::common::{member, TestApp};

/// Not a real image; the server checks extensions only.
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-data";

fn avatar_form(file_name: &str, data: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part(
        "avatar",
        Part::bytes(data).file_name(file_name).mime_type("image/png"),
    )
}

#[tokio::test]
async fn test_register_is_find_or_create() {
    let app = TestApp::new().await;

    let created = app
        .server
        .post("/api/v1/users/register")
        .json(&json!({ "deviceId": "device-a" }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let first: Value = created.json();
    assert_eq!(first["isNew"], true);
    assert_eq!(first["deviceId"], "device-a");

    let again = app
        .server
        .post("/api/v1/users/register")
        .json(&json!({ "deviceId": "device-a" }))
        .await;
    again.assert_status_ok();
    let second: Value = again.json();
    assert_eq!(second["isNew"], false);
    assert_eq!(second["id"], first["id"]);
}

#[tokio::test]
async fn test_register_rejects_empty_device_id() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/v1/users/register")
        .json(&json!({ "deviceId": "" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], 10007);
}

#[tokio::test]
async fn test_get_user() {
    let app = TestApp::new().await;
    let user = app.register("device-a").await;

    let response = app.server.get(&format!("/api/v1/users/{}", user)).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["id"], user.as_str());
    assert!(body.get("isNew").is_none());
}

#[tokio::test]
async fn test_get_missing_user() {
    let app = TestApp::new().await;

    let response = app.server.get("/api/v1/users/missing").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], 10001);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_avatar_upload_and_download() {
    let app = TestApp::new().await;
    let user = app.register("device-a").await;

    let response = app
        .server
        .post(&format!("/api/v1/users/{}/avatar", user))
        .multipart(avatar_form("me.PNG", PNG_BYTES.to_vec()))
        .await;

    response.assert_status_ok();
    let expected = format!("{}.png", user);
    assert_eq!(response.json::<Value>()["avatarPath"], expected.as_str());
    assert!(app.avatar_dir.path().join(&expected).exists());

    let download = app
        .server
        .get(&format!("/api/v1/users/{}/avatar", user))
        .await;
    download.assert_status_ok();
    assert_eq!(download.header("content-type"), "image/png");
    assert_eq!(download.as_bytes().as_ref(), PNG_BYTES);
}

#[tokio::test]
async fn test_replacing_avatar_removes_previous_file() {
    let app = TestApp::new().await;
    let user = app.register("device-a").await;
    let url = format!("/api/v1/users/{}/avatar", user);

    app.server
        .post(&url)
        .multipart(avatar_form("me.png", PNG_BYTES.to_vec()))
        .await
        .assert_status_ok();
    app.server
        .post(&url)
        .multipart(avatar_form("me.gif", b"GIF89a".to_vec()))
        .await
        .assert_status_ok();

    assert!(!app.avatar_dir.path().join(format!("{}.png", user)).exists());
    assert!(app.avatar_dir.path().join(format!("{}.gif", user)).exists());

    let download = app.server.get(&url).await;
    assert_eq!(download.header("content-type"), "image/gif");
}

#[tokio::test]
async fn test_avatar_rejects_unknown_extension() {
    let app = TestApp::new().await;
    let user = app.register("device-a").await;

    let response = app
        .server
        .post(&format!("/api/v1/users/{}/avatar", user))
        .multipart(avatar_form("notes.txt", b"hello".to_vec()))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_avatar_rejects_oversized_file() {
    let app = TestApp::new().await;
    let user = app.register("device-a").await;

    let response = app
        .server
        .post(&format!("/api/v1/users/{}/avatar", user))
        .multipart(avatar_form("big.png", vec![0u8; 1024 * 1024 + 1]))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.json::<Value>()["error"], "payload_too_large");
}

#[tokio::test]
async fn test_avatar_requires_avatar_field() {
    let app = TestApp::new().await;
    let user = app.register("device-a").await;

    let form = MultipartForm::new().add_text("comment", "no file here");
    let response = app
        .server
        .post(&format!("/api/v1/users/{}/avatar", user))
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "No avatar file provided");
}

#[tokio::test]
async fn test_avatar_missing_when_never_uploaded() {
    let app = TestApp::new().await;
    let user = app.register("device-a").await;

    let response = app
        .server
        .get(&format!("/api/v1/users/{}/avatar", user))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["message"], "No avatar set");
}

#[tokio::test]
async fn test_delete_user_keeps_anonymous_activity() {
    let app = TestApp::new().await;
    let alice = app.register("device-a").await;
    let room = app.create_room(&alice, None).await;
    let bob = app.register("device-b").await;
    app.join(&room, &bob, None).await;

    app.heartbeat(&room, &alice, Some("Editor"), false).await;
    app.heartbeat(&room, &alice, Some("Editor"), false).await;
    app.server
        .post(&format!("/api/v1/users/{}/avatar", alice))
        .multipart(avatar_form("me.png", PNG_BYTES.to_vec()))
        .await
        .assert_status_ok();

    app.server
        .delete(&format!("/api/v1/users/{}", alice))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .get(&format!("/api/v1/users/{}", alice))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    assert!(!app.avatar_dir.path().join(format!("{}.png", alice)).exists());
    assert!(app
        .store
        .activity()
        .iter()
        .all(|entry| entry.user_id.starts_with(ANONYMOUS_PREFIX)));

    let body: Value = app.stats(&room, &bob, "today").await.json();
    assert_eq!(body["members"].as_array().unwrap().len(), 1);
    assert_eq!(member(&body, &bob)["totalSeconds"], 0);
    assert_eq!(
        body["topApps"],
        json!([{ "appName": "Editor", "totalSeconds": 10 }])
    );
}

#[tokio::test]
async fn test_deleted_user_heartbeats_are_refused() {
    let app = TestApp::new().await;
    let alice = app.register("device-a").await;
    let room = app.create_room(&alice, None).await;
    app.heartbeat(&room, &alice, Some("Editor"), false).await;

    app.server
        .delete(&format!("/api/v1/users/{}", alice))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.heartbeat(&room, &alice, Some("Editor"), false)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let activity = app.store.activity();
    assert_eq!(activity.len(), 1);
    assert!(activity.iter().all(|entry| entry.user_id != alice));
}

#[tokio::test]
async fn test_delete_missing_user() {
    let app = TestApp::new().await;

    app.server
        .delete("/api/v1/users/missing")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
