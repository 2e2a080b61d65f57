use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::auth::CurrentIdentity;
use crate::api::common::{ApiError, ApiResult};
use crate::db::UploadedFile;
use crate::storage::sanitize_filename;
use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    id: String,
    filename: String,
    size: i64,
    message: String,
}

#[derive(Serialize, ToSchema)]
pub struct FileResponse {
    id: String,
    filename: String,
    size: i64,
    created_at: DateTime<Utc>,
}

impl From<UploadedFile> for FileResponse {
    fn from(f: UploadedFile) -> Self {
        Self {
            id: f.id,
            filename: f.filename,
            size: f.size,
            created_at: f.created_at,
        }
    }
}

// Oversized bodies surface here as 413 rather than a generic 400.
fn multipart_error(err: MultipartError) -> ApiError {
    let status = err.status();
    let error_type = if status == StatusCode::PAYLOAD_TOO_LARGE {
        "PAYLOAD_TOO_LARGE"
    } else {
        "BAD_REQUEST"
    };
    ApiError::new(status, format!("Malformed upload: {}", err.body_text()), error_type)
}

/// Upload a file (multipart field `file`)
#[utoipa::path(
    post,
    path = "/upload",
    tag = "Uploads",
    request_body(content = String, content_type = "multipart/form-data", description = "Form with a `file` field"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "No file selected"),
        (status = 401, description = "Not authenticated"),
        (status = 413, description = "File too large")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Extension(CurrentIdentity(identity)): Extension<CurrentIdentity>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .and_then(sanitize_filename)
            .ok_or_else(|| ApiError::bad_request("No file selected"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(multipart_error)?;

        let size = i64::try_from(bytes.len()).map_err(|_| ApiError::internal("File size overflow"))?;
        let stored = state.files.save(&filename, &bytes).await?;

        let record = match state.store.create_file(&filename, size, &identity).await {
            Ok(record) => record,
            Err(e) => {
                // Bytes without a metadata record are unreachable.
                if let Err(cleanup) = state.files.remove(&stored).await {
                    tracing::warn!(
                        path = %stored.path.display(),
                        error = %cleanup,
                        "Failed to remove orphaned upload"
                    );
                }
                return Err(e.into());
            }
        };

        tracing::info!(file_id = %record.id, size, "Stored upload");

        return Ok(Json(UploadResponse {
            id: record.id,
            filename: record.filename,
            size: record.size,
            message: "File uploaded successfully".to_string(),
        }));
    }

    Err(ApiError::bad_request("No file selected"))
}

/// List the caller's uploaded files
#[utoipa::path(
    get,
    path = "/uploads",
    tag = "Uploads",
    responses(
        (status = 200, description = "Files uploaded by the caller", body = [FileResponse]),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_uploads(
    State(state): State<Arc<AppState>>,
    Extension(CurrentIdentity(identity)): Extension<CurrentIdentity>,
) -> ApiResult<Json<Vec<FileResponse>>> {
    let files = state.store.get_files_by_owner(&identity).await?;
    Ok(Json(files.into_iter().map(Into::into).collect()))
}
