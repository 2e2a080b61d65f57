use axum::{
  extract::{Request, State},
  http::{header::AUTHORIZATION, HeaderMap},
  middleware::Next,
  response::Response,
};
use std::sync::Arc;

use crate::api::common::ApiError;
use crate::AppState;

/// Identity proven by the request's bearer token.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub String);

// Middleware that verifies the bearer token on every non-public route
pub async fn require_bearer_token(
  State(state): State<Arc<AppState>>,
  mut request: Request,
  next: Next,
) -> Result<Response, ApiError> {
  if should_skip_auth(request.uri().path()) {
    return Ok(next.run(request).await);
  }

  let identity = {
    let token = bearer_token(request.headers()).ok_or_else(ApiError::unauthenticated)?;
    state.credentials.verify_token(token)?
  };

  request.extensions_mut().insert(CurrentIdentity(identity));
  Ok(next.run(request).await)
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(AUTHORIZATION)
    .and_then(|h| h.to_str().ok())
    .and_then(|s| s.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

fn should_skip_auth(path: &str) -> bool {
  matches!(path, "/health" | "/auth/register" | "/auth/login")
    || path.starts_with("/docs")
    || path.starts_with("/api-docs")
}
