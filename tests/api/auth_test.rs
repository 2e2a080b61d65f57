// Integration tests for registration, login and bearer authentication
use axum::http::StatusCode;
use serde_json::json;

use crate::common::{get_request, json_request, register, send, test_app, test_credentials};

#[tokio::test]
async fn test_health_is_public() {
  let (app, _dir) = test_app().await;

  let (status, body) = send(&app, get_request("/health", None)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "healthy");
  assert_eq!(body["backend"], "memory");
  assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_openapi_document_is_public() {
  let (app, _dir) = test_app().await;

  let (status, body) = send(&app, get_request("/api-docs/openapi.json", None)).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["paths"]["/auth/register"].is_object());
  assert!(body["paths"]["/chat/send"].is_object());
}

#[tokio::test]
async fn test_register_login_and_me() {
  let (app, _dir) = test_app().await;

  let (status, body) = send(
    &app,
    json_request(
      "POST",
      "/auth/register",
      None,
      json!({ "email": "A@X.com", "password": "pw" }),
    ),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["user"]["email"], "a@x.com");
  assert!(body["user"]["id"].as_str().unwrap().starts_with("user_"));
  assert!(body["user"].get("password_hash").is_none());

  let (status, body) = send(
    &app,
    json_request(
      "POST",
      "/auth/login",
      None,
      json!({ "email": "a@x.com", "password": "pw" }),
    ),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let token = body["token"].as_str().unwrap().to_string();

  let (status, body) = send(&app, get_request("/auth/me", Some(&token))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["email"], "a@x.com");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
  let (app, _dir) = test_app().await;
  register(&app, "a@x.com", "pw").await;

  let (status, body) = send(
    &app,
    json_request(
      "POST",
      "/auth/register",
      None,
      json!({ "email": "a@x.com", "password": "other" }),
    ),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["error_type"], "EMAIL_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_register_rejects_missing_fields() {
  let (app, _dir) = test_app().await;

  let (status, _) = send(
    &app,
    json_request(
      "POST",
      "/auth/register",
      None,
      json!({ "email": "a@x.com", "password": "" }),
    ),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
  let (app, _dir) = test_app().await;
  register(&app, "a@x.com", "pw").await;

  for body in [
    json!({ "email": "a@x.com", "password": "wrong" }),
    json!({ "email": "nobody@x.com", "password": "pw" }),
  ] {
    let (status, body) = send(&app, json_request("POST", "/auth/login", None, body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
  }
}

#[tokio::test]
async fn test_protected_routes_require_token() {
  let (app, _dir) = test_app().await;

  for uri in ["/auth/me", "/projects", "/chat/messages", "/uploads"] {
    let (status, body) = send(&app, get_request(uri, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{} without token", uri);
    assert_eq!(body["error_type"], "UNAUTHORIZED");
  }
}

#[tokio::test]
async fn test_tampered_token_is_rejected() {
  let (app, _dir) = test_app().await;
  let token = register(&app, "a@x.com", "pw").await;

  // Alter one character inside the claims segment.
  let at = token.find('.').unwrap() + 5;
  let replacement = if &token[at..at + 1] == "a" { "b" } else { "a" };
  let mut tampered = token.clone();
  tampered.replace_range(at..at + 1, replacement);

  for bad in [tampered.as_str(), "garbage", "a.b.c"] {
    let (status, _) = send(&app, get_request("/auth/me", Some(bad))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  let (status, _) = send(&app, get_request("/auth/me", Some(&token))).await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_expired_token_gets_same_rejection_as_forged() {
  let (app, _dir) = test_app().await;
  let token = register(&app, "a@x.com", "pw").await;

  // Same secret as the app, but already past its expiry.
  let expired = test_credentials()
    .issue_token("a@x.com", Some(chrono::Duration::seconds(-1)))
    .expect("Failed to issue token");
  let (expired_status, expired_body) = send(&app, get_request("/auth/me", Some(&expired))).await;

  let forged = format!("{}x", token);
  let (forged_status, forged_body) = send(&app, get_request("/auth/me", Some(&forged))).await;

  assert_eq!(expired_status, StatusCode::UNAUTHORIZED);
  assert_eq!(forged_status, StatusCode::UNAUTHORIZED);
  assert_eq!(expired_body, forged_body);
  assert_eq!(expired_body["error_type"], "UNAUTHORIZED");
}
