use crate::agent::ChatAgent;
use crate::models::api::{
    ChatRequest,
    ChatResponse,
    ErrorResponse,
    HealthResponse,
    MessageResponse,
    ResetQuery,
    DEFAULT_CONVERSATION_ID,
};
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::{ State, Query },
    response::{ IntoResponse, Response },
    http::{ HeaderValue, StatusCode },
};
use serde_json::json;
use tower_http::cors::{ AllowHeaders, AllowMethods, AllowOrigin, CorsLayer };
use log::{ info, error };

const LOCAL_ORIGINS: [&str; 2] = ["http://localhost:3001", "http://localhost:3000"];

#[derive(Clone)]
struct AppState {
    agent: Arc<ChatAgent>,
}

/// Failure of a chat turn, reported as 500 with the error text in `detail`.
struct ApiError(String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { detail: self.0 })).into_response()
    }
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let origins: Vec<HeaderValue> = std::iter
        ::once(frontend_url.trim_end_matches('/'))
        .chain(LOCAL_ORIGINS)
        .filter(|origin| !origin.is_empty() && *origin != "*")
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn router(agent: Arc<ChatAgent>, frontend_url: &str) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .route("/reset", post(reset_handler))
        .layer(cors_layer(frontend_url))
        .with_state(AppState { agent })
}

async fn root_handler() -> impl IntoResponse {
    Json(
        json!({
            "message": "Real Estate Chatbot API",
            "status": "running",
            "endpoints": { "chat": "/chat", "health": "/health" }
        })
    )
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>
) -> Result<Json<ChatResponse>, ApiError> {
    let conversation_id = req.conversation_id().to_string();
    info!("Chat request for conversation '{}'", conversation_id);

    match state.agent.process_message(&conversation_id, &req.message).await {
        Ok(response) => Ok(Json(ChatResponse { response, conversation_id })),
        Err(e) => {
            error!("Chat turn failed for '{}': {}", conversation_id, e);
            Err(ApiError(e.to_string()))
        }
    }
}

async fn reset_handler(
    State(state): State<AppState>,
    Query(query): Query<ResetQuery>
) -> Json<MessageResponse> {
    let conversation_id = query.conversation_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_CONVERSATION_ID);
    state.agent.reset_conversation(conversation_id).await;
    Json(MessageResponse { message: "Conversation reset successfully".into() })
}
