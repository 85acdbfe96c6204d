use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use parley_chats::{
    AddMessageRequest, AddParticipantRequest, CreateChatRequest, HydratedChat, NewMessage,
};

use crate::{error::ErrorResponse, ApiError, AppState};

#[utoipa::path(
    post,
    path = "/chats",
    tag = "Chats",
    request_body = CreateChatRequest,
    responses(
        (status = 201, description = "Chat created and announced to all connections", body = HydratedChat),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 500, description = "A participant could not be resolved or a write failed", body = ErrorResponse)
    )
)]
pub async fn create_chat(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateChatRequest>, ApiError>,
) -> Result<(StatusCode, Json<HydratedChat>), ApiError> {
    let chat = state.chat_service().create_chat(payload).await?;
    Ok((StatusCode::CREATED, Json(chat)))
}

#[utoipa::path(
    get,
    path = "/chats/{chat_id}",
    tag = "Chats",
    params(
        ("chat_id" = String, Path, description = "Chat id (UUID)")
    ),
    responses(
        (status = 200, description = "Hydrated chat", body = HydratedChat),
        (status = 400, description = "Malformed chat id", body = ErrorResponse),
        (status = 404, description = "Chat not found", body = ErrorResponse),
        (status = 500, description = "Failed to load chat", body = ErrorResponse)
    )
)]
pub async fn get_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<HydratedChat>, ApiError> {
    let chat = state.chat_service().get_chat(&chat_id).await?;
    Ok(Json(chat))
}

#[utoipa::path(
    get,
    path = "/chats/user/{username}",
    tag = "Chats",
    params(
        ("username" = String, Path, description = "Participant username")
    ),
    responses(
        (status = 200, description = "Every chat the user takes part in", body = Vec<HydratedChat>),
        (status = 500, description = "Failed to load one or more chats", body = ErrorResponse)
    )
)]
pub async fn list_user_chats(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<HydratedChat>>, ApiError> {
    let chats = state.chat_service().list_chats_for_user(&username).await?;
    Ok(Json(chats))
}

#[utoipa::path(
    post,
    path = "/chats/{chat_id}/messages",
    tag = "Chats",
    params(
        ("chat_id" = String, Path, description = "Chat id (UUID)")
    ),
    request_body = NewMessage,
    responses(
        (status = 200, description = "Updated chat, also pushed to the chat's channel", body = HydratedChat),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 404, description = "Chat or sender not found", body = ErrorResponse),
        (status = 500, description = "Failed to store message", body = ErrorResponse)
    )
)]
pub async fn add_message(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<AddMessageRequest>, ApiError>,
) -> Result<Json<HydratedChat>, ApiError> {
    let chat = state.chat_service().add_message(&chat_id, payload).await?;
    Ok(Json(chat))
}

#[utoipa::path(
    post,
    path = "/chats/{chat_id}/participants",
    tag = "Chats",
    params(
        ("chat_id" = String, Path, description = "Chat id (UUID)")
    ),
    request_body = AddParticipantRequest,
    responses(
        (status = 200, description = "Updated chat", body = HydratedChat),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 404, description = "Chat or user not found", body = ErrorResponse),
        (status = 500, description = "Failed to add participant", body = ErrorResponse)
    )
)]
pub async fn add_participant(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<AddParticipantRequest>, ApiError>,
) -> Result<Json<HydratedChat>, ApiError> {
    let chat = state
        .chat_service()
        .add_participant(&chat_id, payload)
        .await?;
    Ok(Json(chat))
}
