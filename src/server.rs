//! Chat HTTP endpoint
//!
//! A small JSON API: `POST /chat` feeds one user message into a session
//! and returns the assistant reply, `GET /` reports liveness. Sessions are
//! created implicitly on first contact; the per-session mutex means a
//! slow turn never blocks other sessions, only later turns of its own.
//! A client disconnect does not cancel an in-progress turn; its outcome
//! lands in the session and is visible on the next request.

use crate::agent::Orchestrator;
use crate::config::ServerConfig;
use crate::error::Result;
use crate::session::{MessageContent, SessionRegistry};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Live sessions
    pub sessions: Arc<SessionRegistry>,
    /// Turn handler
    pub orchestrator: Arc<Orchestrator>,
}

/// One incoming chat turn
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Session the turn belongs to; created on first use
    pub session_id: String,
    /// The user's message
    pub message: String,
}

/// The assistant reply for a turn
#[derive(Debug, Serialize)]
pub struct ChatReply {
    /// Always "assistant"
    pub role: &'static str,
    /// Plain text or a structured listing
    pub content: MessageContent,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Builds the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/chat", post(chat))
        .with_state(state)
}

/// Binds and serves the chat endpoint until the process is stopped
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("chat endpoint listening on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    if request.session_id.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!(ErrorBody {
                error: "session_id must not be empty".to_string(),
            })),
        );
    }

    let session_id = request.session_id;
    let message = request.message;
    let session = state.sessions.get_or_create(&session_id).await;
    let orchestrator = state.orchestrator.clone();

    // The turn must survive a dropped connection: a confirm may already
    // be in flight at the provider, and cancelling here would lose the
    // booking. The turn runs on a detached task; the session mutex makes
    // its outcome visible to the next request on the same session.
    let turn = tokio::spawn(async move {
        let mut session = session.lock().await;
        orchestrator.handle_turn(&mut session, &message).await
    });

    match turn.await {
        Ok(Ok(reply)) => (
            StatusCode::OK,
            Json(serde_json::json!(ChatReply {
                role: "assistant",
                content: reply.content,
            })),
        ),
        Ok(Err(e)) => {
            tracing::error!("turn failed for session {}: {}", session_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!(ErrorBody {
                    error: "internal error handling the turn".to_string(),
                })),
            )
        }
        Err(e) => {
            tracing::error!("turn task for session {} aborted: {}", session_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!(ErrorBody {
                    error: "internal error handling the turn".to_string(),
                })),
            )
        }
    }
}
