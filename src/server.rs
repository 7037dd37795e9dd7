use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::logging::{LogLevel, SharedJournal};
use crate::relay;
use crate::translate::openai_types::{ChatCompletionRequest, ErrorResponse, ModelCard, ModelList};
use crate::translate::{ChatbotUiTranslator, Translator};

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// `Content-Type` of streamed replies. The backend bytes are relayed as-is.
pub const STREAM_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[derive(Clone)]
pub struct AppState {
    pub config: BridgeConfig,
    pub client: reqwest::Client,
    pub translator: Arc<dyn Translator>,
    pub journal: SharedJournal,
}

impl AppState {
    /// State for the Chatbot UI backend with a fresh HTTP client.
    /// Outbound calls carry no deadline.
    pub fn new(config: BridgeConfig, journal: SharedJournal) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            config,
            client,
            translator: Arc::new(ChatbotUiTranslator),
            journal,
        })
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/v1/chat/completions", post(handle_completions))
        .route("/v1/models", get(handle_models))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The single model advertised to callers.
#[must_use]
pub fn model_list() -> ModelList {
    ModelList {
        object: "list".to_string(),
        data: vec![ModelCard {
            id: "gpt-4o".to_string(),
            object: "model".to_string(),
            created: 1_686_935_002,
            owned_by: "openai".to_string(),
        }],
    }
}

async fn handle_completions(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request_id = Uuid::new_v4();

    let req: ChatCompletionRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            state.journal.request(
                LogLevel::Warn,
                request_id,
                "server",
                format!("Failed to parse request: {}", e),
            );
            return error_response(StatusCode::BAD_REQUEST, "Invalid request payload");
        }
    };

    tracing::info!(
        %request_id,
        model = %req.model,
        streaming = req.stream,
        messages = req.messages.len(),
        "chat completion"
    );

    if req.stream {
        handle_streaming(state, &req, request_id).await
    } else {
        handle_buffered(state, &req, request_id).await
    }
}

async fn handle_buffered(
    state: Arc<AppState>,
    req: &ChatCompletionRequest,
    request_id: Uuid,
) -> Response {
    match relay::relay_buffered(
        req,
        &state.config,
        &state.client,
        state.translator.as_ref(),
        &state.journal,
        request_id,
    )
    .await
    {
        Ok(resp) => Json(resp).into_response(),
        Err(e) => relay_failure(&state, request_id, &e),
    }
}

async fn handle_streaming(
    state: Arc<AppState>,
    req: &ChatCompletionRequest,
    request_id: Uuid,
) -> Response {
    let stream = match relay::relay_streaming(
        req,
        &state.config,
        &state.client,
        state.translator.as_ref(),
        &state.journal,
        request_id,
    )
    .await
    {
        Ok(s) => s,
        Err(e) => return relay_failure(&state, request_id, &e),
    };

    // No length is known, so HTTP/1.1 replies go out with chunked encoding.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, STREAM_CONTENT_TYPE)
        .body(Body::from_stream(stream))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

async fn handle_models() -> Json<ModelList> {
    Json(model_list())
}

fn relay_failure(state: &AppState, request_id: Uuid, err: &BridgeError) -> Response {
    tracing::error!(%request_id, error = %err, "relay failed");
    state
        .journal
        .request(LogLevel::Error, request_id, "server", format!("Relay error: {}", err));
    error_response(err.status(), err.public_message())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}
