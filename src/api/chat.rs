//! Text chat and session endpoints
//!
//! Runs the same dispatch loop as the voice path, over HTTP.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ApiState, MAX_HISTORY_MESSAGES};
use crate::db::MessageRole;

/// Build chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/sessions", get(list_sessions))
        .route("/sessions/{id}/messages", get(session_messages))
        .route("/sessions/{id}/reset", post(reset_session))
        .with_state(state)
}

/// Chat request body
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Continue an existing session; omit to start a new one
    pub session_id: Option<String>,
}

/// Chat response body
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub session_id: String,
}

/// Handle a text chat turn
async fn chat(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ChatError> {
    let agent = state
        .agent
        .as_ref()
        .ok_or(ChatError::NotConfigured("chat not configured (no LLM API key)"))?;

    if request.message.trim().is_empty() {
        return Err(ChatError::BadRequest("Empty message"));
    }

    let session = match &request.session_id {
        Some(id) => state
            .session_repo
            .find(id)
            .map_err(|e| ChatError::Internal(e.to_string()))?
            .ok_or(ChatError::SessionNotFound)?,
        None => {
            let channel_id = uuid::Uuid::new_v4().to_string();
            state
                .session_repo
                .find_or_create("api", &channel_id)
                .map_err(|e| ChatError::Internal(e.to_string()))?
        }
    };

    let history = state
        .session_repo
        .get_messages(&session.id, MAX_HISTORY_MESSAGES)
        .map_err(|e| ChatError::Internal(e.to_string()))?;

    let reply = agent.respond(&history, &request.message).await;

    if let Err(e) = state
        .session_repo
        .add_message(&session.id, MessageRole::User, &request.message)
        .and_then(|_| {
            state
                .session_repo
                .add_message(&session.id, MessageRole::Assistant, &reply)
        })
    {
        tracing::warn!(error = %e, "failed to persist chat turn");
    }

    Ok(Json(ChatResponse {
        reply,
        session_id: session.id,
    }))
}

/// Session summary for listings
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub id: String,
    pub channel: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List all sessions
async fn list_sessions(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<SessionInfo>>, ChatError> {
    let sessions = state
        .session_repo
        .list_all()
        .map_err(|e| ChatError::Internal(e.to_string()))?;

    Ok(Json(
        sessions
            .into_iter()
            .map(|s| SessionInfo {
                id: s.id,
                channel: s.channel,
                created_at: s.created_at,
                updated_at: s.updated_at,
            })
            .collect(),
    ))
}

/// Message view for history rendering
#[derive(Debug, Serialize)]
pub struct MessageInfo {
    pub role: &'static str,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Get the messages of a session
async fn session_messages(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MessageInfo>>, ChatError> {
    state
        .session_repo
        .find(&id)
        .map_err(|e| ChatError::Internal(e.to_string()))?
        .ok_or(ChatError::SessionNotFound)?;

    let messages = state
        .session_repo
        .get_messages(&id, 1000)
        .map_err(|e| ChatError::Internal(e.to_string()))?;

    Ok(Json(
        messages
            .into_iter()
            .map(|m| MessageInfo {
                role: match m.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                },
                content: m.content,
                created_at: m.created_at,
            })
            .collect(),
    ))
}

/// Clear a session's conversation
async fn reset_session(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ChatError> {
    state
        .session_repo
        .find(&id)
        .map_err(|e| ChatError::Internal(e.to_string()))?
        .ok_or(ChatError::SessionNotFound)?;

    state
        .session_repo
        .clear_messages(&id)
        .map_err(|e| ChatError::Internal(e.to_string()))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Chat API errors
#[derive(Debug)]
pub enum ChatError {
    NotConfigured(&'static str),
    BadRequest(&'static str),
    SessionNotFound,
    Internal(String),
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code, message) = match self {
            Self::NotConfigured(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "not_configured",
                msg.to_string(),
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.to_string()),
            Self::SessionNotFound => (
                StatusCode::NOT_FOUND,
                "session_not_found",
                "session not found".to_string(),
            ),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
        };

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody { code, message },
            }),
        )
            .into_response()
    }
}
