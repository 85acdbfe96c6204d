//! # Parley Gateway Crate
//!
//! HTTP and websocket surface for Parley. REST handlers translate requests
//! into [`parley_chats::ChatService`] calls and map [`parley_chats::ChatError`]
//! onto status codes; the websocket endpoint streams chat updates from the
//! [`RealtimeHub`].

mod docs;
mod error;
mod state;

pub mod routes;
pub mod websocket;

pub use docs::ApiDoc;
pub use error::{ApiError, ErrorResponse};
pub use state::AppState;
pub use websocket::{RealtimeHub, ServerEvent};

use axum::{
    http::header::CONTENT_TYPE,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        // Chat routes
        .route("/chats", post(routes::chats::create_chat))
        .route("/chats/:chat_id", get(routes::chats::get_chat))
        .route(
            "/chats/user/:username",
            get(routes::chats::list_user_chats),
        )
        .route(
            "/chats/:chat_id/messages",
            post(routes::chats::add_message),
        )
        .route(
            "/chats/:chat_id/participants",
            post(routes::chats::add_participant),
        )
        // WebSocket route
        .route("/ws", get(websocket::websocket_handler))
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
}
