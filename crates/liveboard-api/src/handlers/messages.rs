//! Message handlers. Live fan-out reuses the chat engine's router.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use liveboard_core::types::{MessageId, UserId};
use liveboard_entity::{ChatMessage, PrivateChatMessage};
use liveboard_realtime::ConversationKey;

use crate::dto::request::{SendMessageRequest, UpdateMessageRequest};
use crate::dto::response::{ApiResponse, DeletedResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/messages
pub async fn recent_broadcasts(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, ApiError> {
    let key = ConversationKey::Global {
        limit: state.config.realtime.rest_history_limit,
    };
    let history = state.engine.router.history(key).await?;
    Ok(Json(ApiResponse::ok(history)))
}

/// GET /api/messages/with/{user_id}
pub async fn conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(peer): Path<UserId>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, ApiError> {
    let history = state
        .engine
        .router
        .history(ConversationKey::Direct(auth.user_id, peer))
        .await?;
    Ok(Json(ApiResponse::ok(history)))
}

/// POST /api/messages
pub async fn send_direct(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PrivateChatMessage>>), ApiError> {
    let sent = state
        .engine
        .router
        .send_direct(auth.user_id, None, req.recipient_id, &req.text)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(sent))))
}

/// PUT /api/messages/{message_id}
pub async fn edit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(message_id): Path<MessageId>,
    ValidatedJson(req): ValidatedJson<UpdateMessageRequest>,
) -> Result<Json<ApiResponse<ChatMessage>>, ApiError> {
    let edited = state
        .engine
        .router
        .edit_message(auth.user_id, message_id, &req.text)
        .await?;
    Ok(Json(ApiResponse::ok(edited)))
}

/// DELETE /api/messages/{message_id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(message_id): Path<MessageId>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    state
        .engine
        .router
        .delete_message(auth.user_id, message_id)
        .await?;
    Ok(Json(ApiResponse::ok(DeletedResponse { id: message_id })))
}
