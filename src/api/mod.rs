//! HTTP API server for Nova gateway
//!
//! The backend a dashboard frontend talks to: text chat over the same
//! dispatch loop the voice path uses, session history, and voice
//! endpoints.

pub mod chat;
pub mod health;
pub mod voice;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::agent::SupportAgent;
use crate::db::{DbPool, SessionRepo};
use crate::voice::{SpeechToText, TextToSpeech};
use crate::Result;

/// Max persisted messages replayed into a chat request
pub const MAX_HISTORY_MESSAGES: usize = 20;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub db: DbPool,
    /// Present only when an LLM API key is configured
    pub agent: Option<Arc<SupportAgent>>,
    pub session_repo: SessionRepo,
    pub stt: Option<Arc<SpeechToText>>,
    pub tts: Option<Arc<TextToSpeech>>,
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    db: DbPool,
    port: u16,
    agent: Option<Arc<SupportAgent>>,
    stt: Option<Arc<SpeechToText>>,
    tts: Option<Arc<TextToSpeech>>,
    static_dir: Option<PathBuf>,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub const fn new(db: DbPool, port: u16) -> Self {
        Self {
            db,
            port,
            agent: None,
            stt: None,
            tts: None,
            static_dir: None,
        }
    }

    /// Set the support agent for chat
    #[must_use]
    pub fn agent(mut self, agent: Arc<SupportAgent>) -> Self {
        self.agent = Some(agent);
        self
    }

    /// Set the STT client
    #[must_use]
    pub fn stt(mut self, stt: Arc<SpeechToText>) -> Self {
        self.stt = Some(stt);
        self
    }

    /// Set the TTS client
    #[must_use]
    pub fn tts(mut self, tts: Arc<TextToSpeech>) -> Self {
        self.tts = Some(tts);
        self
    }

    /// Set the static files directory for serving a dashboard bundle
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let session_repo = SessionRepo::new(self.db.clone());

        let state = Arc::new(ApiState {
            db: self.db,
            agent: self.agent,
            session_repo,
            stt: self.stt,
            tts: self.tts,
        });

        ApiServer {
            state,
            port: self.port,
            static_dir: self.static_dir,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Build the router with all routes
    fn router(&self) -> Router {
        let mut router = Router::new()
            .nest("/api", chat::router(self.state.clone()))
            .nest("/api/voice", voice::router(self.state.clone()))
            .merge(health::router())
            .merge(health::ready_router(self.state.clone()));

        // Serve static files if configured
        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir = ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        }

        // CORS layer for cross-origin requests from frontend
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
