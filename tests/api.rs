//! API endpoint integration tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use nova_gateway::db::{MessageRole, SessionRepo};
use nova_gateway::DbPool;
use tower::ServiceExt;

mod common;
use common::setup_test_db;

/// Build a test API router (no agent or speech engines configured)
fn build_test_router(db: DbPool) -> axum::Router {
    use axum::Router;

    let session_repo = SessionRepo::new(db.clone());

    let state = Arc::new(nova_gateway::api::ApiState {
        db,
        agent: None,
        session_repo,
        stt: None,
        tts: None,
    });

    Router::new()
        .nest("/api", nova_gateway::api::chat::router(state.clone()))
        .nest("/api/voice", nova_gateway::api::voice::router(state.clone()))
        .merge(nova_gateway::api::health::router())
        .merge(nova_gateway::api::health::ready_router(state))
}

#[tokio::test]
async fn test_health_endpoint() {
    let db = setup_test_db();
    let app = build_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_ready_endpoint() {
    let db = setup_test_db();
    let app = build_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    // Should have detailed checks
    assert_eq!(json["status"], "ok");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["agent"]["status"], "unavailable"); // No agent configured in tests
}

#[tokio::test]
async fn test_chat_without_agent_is_unavailable() {
    let db = setup_test_db();
    let app = build_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"message": "Where is my order?"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["code"], "not_configured");
}

#[tokio::test]
async fn test_list_sessions() {
    let db = setup_test_db();

    let session_repo = SessionRepo::new(db.clone());
    let session = session_repo.find_or_create("api", "dashboard-1").unwrap();

    let app = build_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/sessions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert!(json.is_array());
    assert_eq!(json[0]["id"], session.id.as_str());
    assert_eq!(json[0]["channel"], "api");
}

#[tokio::test]
async fn test_session_messages() {
    let db = setup_test_db();

    let session_repo = SessionRepo::new(db.clone());
    let session = session_repo.find_or_create("api", "dashboard-2").unwrap();
    session_repo
        .add_message(&session.id, MessageRole::User, "Hello")
        .unwrap();
    session_repo
        .add_message(&session.id, MessageRole::Assistant, "Hi! How can I help?")
        .unwrap();

    let app = build_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri(&format!("/api/sessions/{}/messages", session.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    let messages = json.as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "Hello");
    assert_eq!(messages[1]["role"], "assistant");
}

#[tokio::test]
async fn test_session_messages_unknown_session() {
    let db = setup_test_db();
    let app = build_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/sessions/no-such-session/messages")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reset_session_clears_messages() {
    let db = setup_test_db();

    let session_repo = SessionRepo::new(db.clone());
    let session = session_repo.find_or_create("api", "dashboard-3").unwrap();
    session_repo
        .add_message(&session.id, MessageRole::User, "Hello")
        .unwrap();

    let app = build_test_router(db.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(&format!("/api/sessions/{}/reset", session.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(session_repo.message_count(&session.id).unwrap(), 0);
}

#[tokio::test]
async fn test_voice_capabilities_without_engines() {
    let db = setup_test_db();
    let app = build_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/voice/capabilities")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["stt_available"], false);
    assert_eq!(json["tts_available"], false);
}

#[tokio::test]
async fn test_transcribe_without_stt_is_unavailable() {
    let db = setup_test_db();
    let app = build_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/voice/transcribe")
                .body(Body::from(vec![0u8; 16]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
