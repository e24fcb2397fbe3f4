//! Google Sign-In API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{TestApp, VALID_TOKEN_PREFIX};

fn id_token(email: &str) -> Value {
    json!({ "idToken": format!("{}{}", VALID_TOKEN_PREFIX, email) })
}

#[tokio::test]
async fn test_first_sign_in_creates_user() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/v1/auth/google")
        .json(&id_token("ada@example.com"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["isNew"], true);
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["deviceId"], "google:ada@example.com");
    assert_eq!(body["name"], "Ada Lovelace");
    assert_eq!(body["avatarPath"], "https://example.com/ada.png");
}

#[tokio::test]
async fn test_repeat_sign_in_returns_same_user() {
    let app = TestApp::new().await;
    let first: Value = app
        .server
        .post("/api/v1/auth/google")
        .json(&id_token("ada@example.com"))
        .await
        .json();

    let response = app
        .server
        .post("/api/v1/auth/google")
        .json(&id_token("ada@example.com"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["isNew"], false);
    assert_eq!(body["id"], first["id"]);
}

#[tokio::test]
async fn test_rejected_token_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/v1/auth/google")
        .json(&json!({ "idToken": "forged" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "unauthorized");
}

#[tokio::test]
async fn test_token_without_email_is_a_validation_error() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/v1/auth/google")
        .json(&id_token(""))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "Email not found in token");
}

#[tokio::test]
async fn test_credential_is_required() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/v1/auth/google")
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "idToken or code required");
}

#[tokio::test]
async fn test_code_flow_without_client_credentials_is_internal() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/v1/auth/google")
        .json(&json!({ "code": "4/abc" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["code"], 10000);
}
