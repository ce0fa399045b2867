use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::message::Message;
use crate::services::relay::RelayService;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub body: String,
}

#[derive(Serialize)]
pub struct MessageDto {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub body: String,
    pub created_at: String,
}

impl From<Message> for MessageDto {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            sender_id: m.sender_id,
            recipient_id: m.recipient_id,
            body: m.body,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// Synchronous counterpart of the live `send` signal. Persists through the
/// same relay operation, so both transports share one archive and one
/// best-effort delivery path.
pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageDto>), AppError> {
    if body.body.is_empty() {
        return Err(AppError::BadRequest("message body cannot be empty".into()));
    }

    let message = RelayService::relay(
        state.archive.as_ref(),
        &state.registry,
        body.sender_id,
        body.recipient_id,
        &body.body,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(message.into())))
}

pub async fn get_conversation_messages(
    State(state): State<AppState>,
    Path((user_a, user_b)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<MessageDto>>, AppError> {
    let messages = state.archive.list_conversation(user_a, user_b).await?;
    Ok(Json(messages.into_iter().map(MessageDto::from).collect()))
}
