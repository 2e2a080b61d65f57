pub mod auth;
pub mod chat;
pub mod common;
pub mod health;
pub mod projects;
pub mod uploads;

pub use health::health;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::AppState;

// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// ProjectManager API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ProjectManager API",
        version = "1.0.0",
        description = "Projects, chat messages and file uploads for registered users"
    ),
    paths(
        health::health,
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::me,
        projects::handlers::create_project,
        projects::handlers::get_projects,
        chat::handlers::get_messages,
        chat::handlers::send_message,
        uploads::handlers::upload_file,
        uploads::handlers::list_uploads,
    ),
    components(schemas(
        common::ErrorResponse,
        health::HealthResponse,
        auth::handlers::CredentialsRequest,
        auth::handlers::UserOut,
        auth::handlers::LoginResponse,
        projects::handlers::CreateProjectRequest,
        projects::handlers::ProjectResponse,
        chat::handlers::SendMessageRequest,
        chat::handlers::MessageResponse,
        chat::handlers::SendMessageResponse,
        uploads::handlers::UploadResponse,
        uploads::handlers::FileResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Registration and bearer sessions"),
        (name = "Projects", description = "Project management endpoints"),
        (name = "Chat", description = "Chat messages"),
        (name = "Uploads", description = "File uploads"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}

/// Every route, behind bearer authentication except the public ones.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = usize::try_from(state.files.max_size())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health))
        // Auth endpoints
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Project endpoints
        .route(
            "/projects",
            get(projects::get_projects).post(projects::create_project),
        )
        // Chat endpoints
        .route("/chat/messages", get(chat::get_messages))
        .route("/chat/send", post(chat::send_message))
        // Upload endpoints
        .route("/upload", post(uploads::upload_file))
        .route("/uploads", get(uploads::list_uploads))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer_token,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid origin in ALLOWED_ORIGINS: {}", o))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}
