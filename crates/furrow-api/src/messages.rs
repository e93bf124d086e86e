use axum::{Json, extract::State};

use furrow_types::api::{CreatedResponse, MessageQuery, MessagesResponse, SendMessageRequest};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::{AppState, run_blocking};

pub async fn send_message(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SendMessageRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let messaging = state.messaging.clone();
    let id = run_blocking(move || {
        messaging.send(&req.sender_id, &req.receiver_id, &req.content)
    })
    .await?;

    Ok(Json(CreatedResponse {
        message: "Message sent".into(),
        id,
    }))
}

/// No pagination: clients poll this for the whole conversation.
pub async fn list_messages(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MessageQuery>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let messaging = state.messaging.clone();
    let messages = run_blocking(move || {
        messaging.list(&query.user_id, query.peer_id.as_deref())
    })
    .await?;

    Ok(Json(MessagesResponse { messages }))
}
