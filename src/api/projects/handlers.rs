use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::auth::CurrentIdentity;
use crate::api::common::{ApiError, ApiResult};
use crate::db::Project;
use crate::AppState;

#[derive(Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    name: String,
    description: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ProjectResponse {
    id: String,
    name: String,
    description: String,
    owner: String,
    created_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            owner: p.owner_identity,
            created_at: p.created_at,
        }
    }
}

/// Confirm `project_id` belongs to `identity`.
pub(crate) async fn ensure_owned_project(
    state: &AppState,
    identity: &str,
    project_id: &str,
) -> ApiResult<()> {
    let owned = state
        .store
        .get_projects_by_owner(identity)
        .await?
        .iter()
        .any(|p| p.id == project_id);

    if !owned {
        return Err(ApiError::not_found("Project not found"));
    }
    Ok(())
}

/// Create a project owned by the caller
#[utoipa::path(
    post,
    path = "/projects",
    tag = "Projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 200, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Extension(CurrentIdentity(identity)): Extension<CurrentIdentity>,
    Json(body): Json<CreateProjectRequest>,
) -> ApiResult<Json<ProjectResponse>> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Project name is required"));
    }

    let project = state
        .store
        .create_project(name, body.description.as_deref().unwrap_or(""), &identity)
        .await?;

    tracing::info!(project_id = %project.id, "Created project");
    Ok(Json(project.into()))
}

/// List the caller's projects
#[utoipa::path(
    get,
    path = "/projects",
    tag = "Projects",
    responses(
        (status = 200, description = "Projects owned by the caller", body = [ProjectResponse]),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_projects(
    State(state): State<Arc<AppState>>,
    Extension(CurrentIdentity(identity)): Extension<CurrentIdentity>,
) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let projects = state.store.get_projects_by_owner(&identity).await?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}
