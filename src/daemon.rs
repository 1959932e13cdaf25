//! Daemon - the main gateway service
//!
//! Orchestrates voice capture, utterance segmentation, STT, the
//! dispatch loop, TTS, and the HTTP API server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::agent::SupportAgent;
use crate::api::{ApiServerBuilder, MAX_HISTORY_MESSAGES};
use crate::db::{self, CatalogRepo, DbPool, MessageRole, OrderRepo, PolicyRepo, SessionRepo};
use crate::llm::ChatClient;
use crate::tools::ToolExecutor;
use crate::voice::{
    samples_to_wav, AudioCapture, AudioPlayback, SpeechSegmenter, SpeechToText, TextToSpeech,
    SAMPLE_RATE,
};
use crate::{Config, Result};

/// Audio processing chunk size (100ms at 16kHz)
const CHUNK_SIZE: usize = 1600;

/// The Nova daemon - orchestrates voice and the HTTP API
pub struct Daemon {
    config: Config,
    db: DbPool,
}

impl Daemon {
    /// Create a new daemon instance
    ///
    /// # Errors
    ///
    /// Returns error if initialization fails
    #[allow(clippy::unused_async)]
    pub async fn new(config: Config) -> Result<Self> {
        let db_path = config.db_path();
        let db = db::init(&db_path)?;

        tracing::info!(path = %db_path.display(), "database initialized");

        Ok(Self { config, db })
    }

    /// Build the support agent over the configured LLM backend
    ///
    /// Returns `None` when no API key is configured; the daemon then
    /// runs in setup mode with chat unavailable.
    fn build_agent(&self) -> Option<Arc<SupportAgent>> {
        let api_key = self.config.api_keys.openai.clone()?;

        let client = match ChatClient::new(self.config.llm.base_url.clone(), api_key) {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(error = %e, "failed to initialize chat client");
                return None;
            }
        };

        let executor = ToolExecutor::new(
            CatalogRepo::new(self.db.clone()),
            OrderRepo::new(self.db.clone()),
            PolicyRepo::new(self.db.clone()),
        );

        tracing::info!(
            url = %self.config.llm.base_url,
            model = %self.config.llm.model,
            "chat client initialized"
        );

        Some(Arc::new(SupportAgent::new(
            client,
            executor,
            self.config.llm.model.clone(),
            self.config.llm.max_tokens,
        )))
    }

    /// Run the daemon until interrupted
    ///
    /// # Errors
    ///
    /// Returns error if the daemon encounters a fatal error
    #[allow(clippy::future_not_send)]
    pub async fn run(self) -> Result<()> {
        let agent = self.build_agent();
        if agent.is_none() {
            tracing::warn!("no LLM API key configured - running in setup mode, chat unavailable");
        }

        let stt = match SpeechToText::from_config(&self.config.voice, &self.config.api_keys) {
            Ok(stt) => Some(Arc::new(stt)),
            Err(e) => {
                tracing::warn!(error = %e, "STT unavailable");
                None
            }
        };
        let tts = match TextToSpeech::from_config(&self.config.voice, &self.config.api_keys) {
            Ok(tts) => Some(Arc::new(tts)),
            Err(e) => {
                tracing::warn!(error = %e, "TTS unavailable");
                None
            }
        };

        // Start HTTP API server
        let mut api_builder = ApiServerBuilder::new(self.db.clone(), self.config.api_server.port)
            .static_dir(self.config.api_server.static_dir.clone());
        if let Some(ref agent) = agent {
            api_builder = api_builder.agent(Arc::clone(agent));
        }
        if let Some(ref stt) = stt {
            api_builder = api_builder.stt(Arc::clone(stt));
        }
        if let Some(ref tts) = tts {
            api_builder = api_builder.tts(Arc::clone(tts));
        }

        let _api_handle = api_builder.build().spawn();
        tracing::info!(port = self.config.api_server.port, "API server started");

        // Set up shutdown signal
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = shutdown_tx.send(()).await;
            }
        });

        // Run voice loop on the main task (cpal streams aren't Send).
        // Needs the agent plus both speech engines.
        if let (true, Some(agent), Some(stt), Some(tts)) =
            (self.config.voice.enabled, &agent, &stt, &tts)
        {
            self.run_voice_loop(
                Arc::clone(agent),
                Arc::clone(stt),
                Arc::clone(tts),
                &mut shutdown_rx,
            )
            .await?;
        } else {
            if self.config.voice.enabled {
                tracing::info!("voice disabled - missing LLM or speech configuration");
            } else {
                tracing::info!("voice disabled - running in API-only mode");
            }
            shutdown_rx.recv().await;
        }

        tracing::info!("daemon stopped");
        Ok(())
    }

    /// Run voice processing loop
    #[allow(clippy::future_not_send)]
    async fn run_voice_loop(
        &self,
        agent: Arc<SupportAgent>,
        stt: Arc<SpeechToText>,
        tts: Arc<TextToSpeech>,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) -> Result<()> {
        let session_repo = SessionRepo::new(self.db.clone());
        let session = session_repo.find_or_create("voice", "local")?;

        let mut segmenter = SpeechSegmenter::new();
        let mut capture = AudioCapture::new()?;
        let mut playback = AudioPlayback::new()?;

        capture.start()?;
        tracing::info!(session = %session.id, "listening");

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("shutdown requested");
                    break;
                }
                () = tokio::time::sleep(Duration::from_millis(100)) => {
                    if let Err(e) = process_voice_chunk(
                        &capture,
                        &mut playback,
                        &mut segmenter,
                        &agent,
                        &stt,
                        &tts,
                        &session_repo,
                        &session.id,
                    ).await {
                        tracing::error!(error = %e, "voice processing error");
                    }
                }
            }
        }

        capture.stop();
        Ok(())
    }
}

/// Process a chunk of voice audio
#[allow(clippy::too_many_arguments)]
async fn process_voice_chunk(
    capture: &AudioCapture,
    playback: &mut AudioPlayback,
    segmenter: &mut SpeechSegmenter,
    agent: &Arc<SupportAgent>,
    stt: &Arc<SpeechToText>,
    tts: &Arc<TextToSpeech>,
    session_repo: &SessionRepo,
    session_id: &str,
) -> Result<()> {
    let samples = capture.take_buffer();

    if samples.len() < CHUNK_SIZE {
        return Ok(());
    }

    // Stale audio piled up while we were speaking; drop it
    if samples.len() > SAMPLE_RATE as usize * 5 {
        tracing::debug!(samples = samples.len(), "discarding stale audio");
        segmenter.reset();
        return Ok(());
    }

    if !segmenter.process(&samples) {
        return Ok(());
    }

    let utterance = segmenter.take_utterance();
    capture.clear_buffer();

    let wav = samples_to_wav(&utterance, SAMPLE_RATE)?;
    match stt.transcribe(&wav).await {
        Ok(text) if text.trim().is_empty() => {
            tracing::debug!("empty transcript, ignoring");
        }
        Ok(text) => {
            tracing::info!(command = %text, "command received");

            let history = session_repo
                .get_messages(session_id, MAX_HISTORY_MESSAGES)
                .unwrap_or_default();
            let reply = agent.respond(&history, &text).await;

            if let Err(e) = session_repo
                .add_message(session_id, MessageRole::User, &text)
                .and_then(|_| session_repo.add_message(session_id, MessageRole::Assistant, &reply))
            {
                tracing::warn!(error = %e, "failed to persist voice turn");
            }

            speak(playback, tts, &reply).await?;
        }
        Err(e) => {
            tracing::warn!(error = %e, "STT failed");
            speak(playback, tts, "Sorry, I didn't catch that").await?;
        }
    }

    Ok(())
}

/// Synthesize and play a spoken reply
async fn speak(playback: &mut AudioPlayback, tts: &TextToSpeech, text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }

    tracing::debug!(text, "speaking");
    let audio = tts.synthesize(text).await?;
    playback.play_mp3(&audio).await
}
