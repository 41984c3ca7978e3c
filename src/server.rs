//! HTTP surface — inbound webhook, outbound reply, console WebSocket.

use std::sync::Arc;

use axum::{
    extract::{ws::WebSocketUpgrade, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::console::ws::handle_socket;
use crate::relay::{InboundMessage, MessageStatus, OutboundReply, RelayPipeline};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RelayPipeline>,
}

/// Build the axum router.
pub fn relay_routes(pipeline: Arc<RelayPipeline>) -> Router {
    let state = AppState { pipeline };

    Router::new()
        .route("/inbound", post(inbound))
        .route("/outbound-reply", post(outbound_reply))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "translate-relay"
    }))
}

/// Inbound SMS webhook.
///
/// The provider gets its acknowledgment immediately; translation and the
/// console push run as a detached task whose failures go to the log, not
/// to this response.
async fn inbound(State(state): State<AppState>, Json(message): Json<InboundMessage>) -> StatusCode {
    info!(
        from = message
            .passthrough
            .get("msisdn")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("?"),
        "Inbound message received"
    );

    let pipeline = Arc::clone(&state.pipeline);
    tokio::spawn(async move {
        pipeline.process_inbound(message).await;
    });

    StatusCode::OK
}

/// Operator reply endpoint.
async fn outbound_reply(
    State(state): State<AppState>,
    Json(reply): Json<OutboundReply>,
) -> impl IntoResponse {
    match state.pipeline.handle_outbound(reply).await {
        Ok(receipt) => (StatusCode::OK, Json(serde_json::json!(receipt))),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({
                "messageStatus": MessageStatus::Failed,
                "error": e.to_string(),
            })),
        ),
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    info!("Console connecting");
    ws.on_upgrade(|socket| handle_socket(socket, state.pipeline))
}
