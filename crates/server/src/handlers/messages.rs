//! Conversation history endpoint

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ApiResult;
use crate::handlers::require_user;
use crate::AppState;

/// One entry of a conversation, as the client renders it.
#[derive(Debug, Serialize)]
pub struct MessageView {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub sender_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ConversationHistory {
    pub messages: Vec<MessageView>,
    pub current_user_id: i64,
}

/// GET /api/messages/{friend_id}
pub async fn conversation_history(
    Path(friend_id): Path<i64>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<ConversationHistory>> {
    let user_id = require_user(&state, &headers).await?;

    let messages = state
        .messages
        .conversation(user_id, friend_id)
        .await?
        .into_iter()
        .map(|m| MessageView {
            message: m.body,
            timestamp: m.sent_at,
            sender_id: m.sender_id,
        })
        .collect();

    Ok(Json(ConversationHistory {
        messages,
        current_user_id: user_id,
    }))
}
