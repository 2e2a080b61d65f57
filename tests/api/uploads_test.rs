// Integration tests for file uploads
use axum::{
  body::Body,
  http::{header, Request, StatusCode},
};
use async_trait::async_trait;
use std::sync::Arc;

use projectmanager_api::db::{Message, Project, Sender, UploadedFile, User, VolatileStore};
use projectmanager_api::error::{StoreError, StoreResult};
use projectmanager_api::RecordStore;

use crate::common::{get_request, register, send, test_app, test_app_with};

const BOUNDARY: &str = "X-TEST-BOUNDARY";

fn multipart_request(token: &str, field: &str, filename: &str, contents: &[u8]) -> Request<Body> {
  let mut body = Vec::new();
  body.extend_from_slice(
    format!(
      "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"{n}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
      b = BOUNDARY,
      f = field,
      n = filename
    )
    .as_bytes(),
  );
  body.extend_from_slice(contents);
  body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

  Request::builder()
    .method("POST")
    .uri("/upload")
    .header(
      header::CONTENT_TYPE,
      format!("multipart/form-data; boundary={}", BOUNDARY),
    )
    .header(header::AUTHORIZATION, format!("Bearer {}", token))
    .body(Body::from(body))
    .unwrap()
}

#[tokio::test]
async fn test_upload_and_list() {
  let (app, dir) = test_app().await;
  let token = register(&app, "a@x.com", "pw").await;

  let (status, body) = send(&app, multipart_request(&token, "file", "notes.txt", b"hello")).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["filename"], "notes.txt");
  assert_eq!(body["size"], 5);
  assert!(body["id"].as_str().unwrap().starts_with("file_"));

  let stored: Vec<_> = std::fs::read_dir(dir.path().join("uploads"))
    .unwrap()
    .map(|e| e.unwrap().file_name().into_string().unwrap())
    .collect();
  assert_eq!(stored.len(), 1);
  assert!(stored[0].ends_with("_notes.txt"));

  let (status, listed) = send(&app, get_request("/uploads", Some(&token))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(listed.as_array().unwrap().len(), 1);
  assert_eq!(listed[0]["id"], body["id"]);

  let other = register(&app, "b@x.com", "pw").await;
  let (_, listed) = send(&app, get_request("/uploads", Some(&other))).await;
  assert_eq!(listed, serde_json::json!([]));
}

#[tokio::test]
async fn test_upload_strips_client_directories() {
  let (app, _dir) = test_app().await;
  let token = register(&app, "a@x.com", "pw").await;

  let (status, body) = send(
    &app,
    multipart_request(&token, "file", "../../etc/passwd", b"x"),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["filename"], "passwd");
}

#[tokio::test]
async fn test_upload_without_file_field() {
  let (app, _dir) = test_app().await;
  let token = register(&app, "a@x.com", "pw").await;

  let (status, body) = send(&app, multipart_request(&token, "other", "a.txt", b"x")).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "No file selected");

  let (status, _) = send(&app, multipart_request(&token, "file", "", b"x")).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_over_limit() {
  let (app, _dir) = test_app_with(Arc::new(VolatileStore::new()), 16).await;
  let token = register(&app, "a@x.com", "pw").await;

  let (status, body) = send(&app, multipart_request(&token, "file", "big.bin", &[0u8; 64])).await;
  assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
  assert_eq!(body["error_type"], "PAYLOAD_TOO_LARGE");

  let (_, listed) = send(&app, get_request("/uploads", Some(&token))).await;
  assert_eq!(listed, serde_json::json!([]));
}

/// In-memory store whose file metadata writes always fail.
#[derive(Default)]
struct FileMetadataDown {
  inner: VolatileStore,
}

#[async_trait]
impl RecordStore for FileMetadataDown {
  fn backend_name(&self) -> &'static str {
    "memory"
  }

  async fn health_check(&self) -> StoreResult<()> {
    self.inner.health_check().await
  }

  async fn create_user(&self, identity: &str, password_hash: &str) -> StoreResult<User> {
    self.inner.create_user(identity, password_hash).await
  }

  async fn get_user_by_identity(&self, identity: &str) -> StoreResult<Option<User>> {
    self.inner.get_user_by_identity(identity).await
  }

  async fn get_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
    self.inner.get_user_by_id(id).await
  }

  async fn create_project(
    &self,
    name: &str,
    description: &str,
    owner_identity: &str,
  ) -> StoreResult<Project> {
    self.inner.create_project(name, description, owner_identity).await
  }

  async fn get_projects_by_owner(&self, owner_identity: &str) -> StoreResult<Vec<Project>> {
    self.inner.get_projects_by_owner(owner_identity).await
  }

  async fn create_message(
    &self,
    content: &str,
    sender: Sender,
    project_id: Option<&str>,
  ) -> StoreResult<Message> {
    self.inner.create_message(content, sender, project_id).await
  }

  async fn get_messages(&self, project_id: Option<&str>) -> StoreResult<Vec<Message>> {
    self.inner.get_messages(project_id).await
  }

  async fn create_file(
    &self,
    _filename: &str,
    _size: i64,
    _owner_identity: &str,
  ) -> StoreResult<UploadedFile> {
    Err(StoreError::BackendUnavailable(sqlx::Error::PoolTimedOut))
  }

  async fn get_files_by_owner(&self, owner_identity: &str) -> StoreResult<Vec<UploadedFile>> {
    self.inner.get_files_by_owner(owner_identity).await
  }
}

#[tokio::test]
async fn test_failed_metadata_write_leaves_no_file() {
  let (app, dir) = test_app_with(Arc::new(FileMetadataDown::default()), 1024).await;
  let token = register(&app, "a@x.com", "pw").await;

  let (status, body) = send(&app, multipart_request(&token, "file", "notes.txt", b"hello")).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["error_type"], "INTERNAL_ERROR");

  let leftover = std::fs::read_dir(dir.path().join("uploads")).unwrap().count();
  assert_eq!(leftover, 0);
}
