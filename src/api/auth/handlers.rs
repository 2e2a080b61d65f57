use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::middleware::CurrentIdentity;
use crate::api::common::{ApiError, ApiResult};
use crate::db::User;
use crate::AppState;

// Request/Response types
#[derive(Deserialize, ToSchema)]
pub struct CredentialsRequest {
  email: String,
  password: String,
}

#[derive(Serialize, ToSchema)]
pub struct UserOut {
  id: String,
  email: String,
}

impl From<User> for UserOut {
  fn from(user: User) -> Self {
    Self {
      id: user.id,
      email: user.email,
    }
  }
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
  token: String,
  user: UserOut,
}

/// Emails are the identity; compare them case-insensitively.
fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}

fn validate(body: &CredentialsRequest) -> ApiResult<String> {
  let email = normalize_email(&body.email);
  if email.is_empty() || !email.contains('@') {
    return Err(ApiError::bad_request("A valid email is required"));
  }
  if body.password.is_empty() {
    return Err(ApiError::bad_request("Password is required"));
  }
  Ok(email)
}

// Auth handlers
/// Register a new account and return a session token
#[utoipa::path(
  post,
  path = "/auth/register",
  tag = "Auth",
  request_body = CredentialsRequest,
  responses(
    (status = 200, description = "Account created", body = LoginResponse),
    (status = 400, description = "Bad request"),
    (status = 409, description = "Email already registered")
  )
)]
pub async fn register(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CredentialsRequest>,
) -> ApiResult<Json<LoginResponse>> {
  let email = validate(&body)?;

  let password_hash = state.credentials.hash_password(&body.password)?;
  let user = state.store.create_user(&email, &password_hash).await?;
  let token = state.credentials.issue_token(&user.email, None)?;

  tracing::info!(user_id = %user.id, "Registered user");

  Ok(Json(LoginResponse {
    token,
    user: user.into(),
  }))
}

/// Exchange email and password for a session token
#[utoipa::path(
  post,
  path = "/auth/login",
  tag = "Auth",
  request_body = CredentialsRequest,
  responses(
    (status = 200, description = "Signed in", body = LoginResponse),
    (status = 401, description = "Invalid credentials")
  )
)]
pub async fn login(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CredentialsRequest>,
) -> ApiResult<Json<LoginResponse>> {
  let email = normalize_email(&body.email);

  let user = state.store.get_user_by_identity(&email).await?;
  let verified = state.credentials.verify_login(
    &body.password,
    user.as_ref().map(|u| u.password_hash.as_str()),
  );

  let user = match user {
    Some(user) if verified => user,
    _ => {
      return Err(ApiError::new(
        StatusCode::UNAUTHORIZED,
        "Invalid credentials",
        "UNAUTHORIZED",
      ))
    }
  };

  let token = state.credentials.issue_token(&user.email, None)?;

  Ok(Json(LoginResponse {
    token,
    user: user.into(),
  }))
}

/// The account behind the current token
#[utoipa::path(
  get,
  path = "/auth/me",
  tag = "Auth",
  responses(
    (status = 200, description = "Current user", body = UserOut),
    (status = 401, description = "Not authenticated"),
    (status = 404, description = "User not found")
  ),
  security(("bearer_auth" = []))
)]
pub async fn me(
  State(state): State<Arc<AppState>>,
  Extension(CurrentIdentity(identity)): Extension<CurrentIdentity>,
) -> ApiResult<Json<UserOut>> {
  let user = state
    .store
    .get_user_by_identity(&identity)
    .await?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

  Ok(Json(user.into()))
}
