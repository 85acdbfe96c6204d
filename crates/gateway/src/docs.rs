use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::chats::create_chat,
        crate::routes::chats::get_chat,
        crate::routes::chats::list_user_chats,
        crate::routes::chats::add_message,
        crate::routes::chats::add_participant,
        crate::websocket::websocket_handler
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::routes::health::HealthResponse,
            parley_chats::CreateChatRequest,
            parley_chats::NewMessage,
            parley_chats::AddParticipantRequest,
            parley_chats::Timestamp,
            parley_chats::HydratedChat,
            parley_chats::HydratedMessage,
            parley_chats::Participant,
            parley_chats::ChatEvent,
            parley_chats::ChatEventKind
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Chats", description = "Direct-message chat operations"),
        (name = "Realtime", description = "Websocket chat updates")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
