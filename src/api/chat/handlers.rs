use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::api::auth::CurrentIdentity;
use crate::api::common::{ApiError, ApiResult};
use crate::api::projects::handlers::ensure_owned_project;
use crate::db::{Message, Sender};
use crate::AppState;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MessagesQuery {
    /// Only return messages of this project
    project_id: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SendMessageRequest {
    content: String,
    project_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    id: String,
    content: String,
    /// "user" or "assistant"
    sender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<String>,
    timestamp: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            content: m.content,
            sender: m.sender.as_str().to_string(),
            project_id: m.project_id,
            timestamp: m.timestamp,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SendMessageResponse {
    message: MessageResponse,
    response: MessageResponse,
}

/// Placeholder assistant: acknowledges the user's message verbatim.
pub fn assistant_reply(content: &str) -> String {
    format!(
        "Entendi sua mensagem: '{}'. Como posso ajudar com seu projeto?",
        content
    )
}

/// Chat history, oldest first
#[utoipa::path(
    get,
    path = "/chat/messages",
    tag = "Chat",
    params(MessagesQuery),
    responses(
        (status = 200, description = "Messages in ascending timestamp order", body = [MessageResponse]),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    Extension(CurrentIdentity(identity)): Extension<CurrentIdentity>,
    Query(query): Query<MessagesQuery>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    if let Some(project_id) = query.project_id.as_deref() {
        ensure_owned_project(&state, &identity, project_id).await?;
    }

    let messages = state.store.get_messages(query.project_id.as_deref()).await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

/// Post a message and receive the assistant's reply
#[utoipa::path(
    post,
    path = "/chat/send",
    tag = "Chat",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Stored message and reply", body = SendMessageResponse),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(CurrentIdentity(identity)): Extension<CurrentIdentity>,
    Json(body): Json<SendMessageRequest>,
) -> ApiResult<Json<SendMessageResponse>> {
    if body.content.trim().is_empty() {
        return Err(ApiError::bad_request("Message content is required"));
    }

    let project_id = body.project_id.as_deref();
    if let Some(project_id) = project_id {
        ensure_owned_project(&state, &identity, project_id).await?;
    }

    let message = state
        .store
        .create_message(&body.content, Sender::User, project_id)
        .await?;
    let response = state
        .store
        .create_message(&assistant_reply(&body.content), Sender::Assistant, project_id)
        .await?;

    Ok(Json(SendMessageResponse {
        message: message.into(),
        response: response.into(),
    }))
}
