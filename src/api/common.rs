use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AuthError, StorageError, StoreError};

pub type ApiResult<T> = Result<T, ApiError>;

/// Standard error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Machine-readable error type code
    pub error_type: String,
}

/// An HTTP status paired with the standard error body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, error_type: &str) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                error_type: error_type.to_string(),
            },
        }
    }

    /// The one signal callers get for any missing, forged or expired credential.
    pub fn unauthenticated() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "Missing or invalid credential",
            "UNAUTHORIZED",
        )
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error, "BAD_REQUEST")
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error, "NOT_FOUND")
    }

    pub fn internal(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error, "INTERNAL_ERROR")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateIdentity(_) => Self::new(
                StatusCode::CONFLICT,
                "Email already registered",
                "EMAIL_ALREADY_EXISTS",
            ),
            StoreError::InvalidReference(what) => {
                Self::bad_request(format!("Unknown reference: {}", what))
            }
            StoreError::BackendUnavailable(e) => {
                tracing::error!(error = %e, "Record store unavailable");
                Self::internal("Internal server error")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.is_unauthenticated() {
            tracing::debug!(reason = %err, "Rejected credential");
            Self::unauthenticated()
        } else {
            tracing::error!(error = %err, "Credential service failure");
            Self::internal("Internal server error")
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidFilename(_) => Self::bad_request("No file selected"),
            StorageError::TooLarge { limit } => Self::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("File exceeds the {} byte limit", limit),
                "PAYLOAD_TOO_LARGE",
            ),
            StorageError::Io(e) => {
                tracing::error!(error = %e, "Failed to store upload");
                Self::internal("Failed to store file")
            }
        }
    }
}
