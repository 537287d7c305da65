//! Anonymous chat handlers.

use axum::extract::State;
use axum::response::Json;
use serde_json::json;

use crate::data::chats::{self, ChatView, NewChatMessage, chat_view};
use crate::state::AppState;
use crate::web::auth::CurrentUser;
use crate::web::error::{ApiError, db_error};

/// `GET /api/chats`
pub async fn list_chats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<ChatView>>, ApiError> {
    let rows = chats::list_chats_for_user(&state.db_pool, user.id)
        .await
        .map_err(|e| db_error("List chats", e))?;

    let views = rows
        .iter()
        .map(|(chat, messages)| chat_view(chat, messages, user.id))
        .collect();
    Ok(Json(views))
}

/// `POST /api/chats/messages`
///
/// Find-or-create the chat with the recipient and append the message.
/// Fire-and-forget: the recipient sees it on their next fetch.
pub async fn send_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<NewChatMessage>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if body.content.trim().is_empty() {
        return Err(ApiError::bad_request("message content is required"));
    }
    if body.recipient_id == user.id {
        return Err(ApiError::bad_request("cannot message yourself"));
    }

    let chat = chats::get_or_create_chat(&state.db_pool, user.id, body.recipient_id)
        .await
        .map_err(|e| db_error("Get or create chat", e))?;

    let message = chats::append_message(&state.db_pool, chat.id, user.id, body.content.trim())
        .await
        .map_err(|e| db_error("Append chat message", e))?;

    let (my_handle, _) = chat.handles_for(user.id);
    Ok(Json(json!({
        "chatId": chat.id,
        "message": {
            "messageId": message.id,
            "senderHandle": my_handle,
            "content": message.content,
            "createdAt": message.created_at,
        }
    })))
}
