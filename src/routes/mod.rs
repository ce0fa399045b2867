use axum::{
    routing::{get, post},
    Router,
};

use crate::config::Config;
use crate::state::AppState;
use crate::websocket::handlers::ws_handler;

pub mod messages;
use messages::{get_conversation_messages, send_message};

pub fn build_router(config: &Config) -> Router<AppState> {
    // Service introspection endpoints (no API version prefix)
    let introspection = Router::new().route("/health", get(|| async { "OK" }));

    // API v1 endpoints (request/response counterparts of the live channel)
    let api_v1 = Router::new()
        .route("/messages", post(send_message))
        .route(
            "/conversations/:user_a/:user_b/messages",
            get(get_conversation_messages),
        );

    let router = introspection
        .route("/ws", get(ws_handler))
        .merge(Router::new().nest("/api/v1", api_v1));

    crate::middleware::with_defaults(router, config)
}
