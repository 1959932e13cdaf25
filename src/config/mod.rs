//! Configuration management for Nova gateway

pub mod file;

use std::path::PathBuf;

use crate::Result;

/// Default OpenAI-compatible endpoint for chat completions
const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Nova gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to data directory (database, cache, etc)
    pub data_dir: PathBuf,

    /// LLM configuration
    pub llm: LlmConfig,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// API keys
    pub api_keys: ApiKeys,

    /// HTTP API server configuration
    pub api_server: ApiServerConfig,

    /// Catalog source files for ingestion
    pub catalog: CatalogConfig,
}

/// LLM chat configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible endpoint
    pub base_url: String,

    /// Model identifier for chat completions
    pub model: String,

    /// Max tokens for responses
    pub max_tokens: u32,
}

/// Voice processing configuration
#[derive(Debug, Clone, Default)]
pub struct VoiceConfig {
    /// Enable voice input/output
    pub enabled: bool,

    /// STT provider ("whisper" or "deepgram")
    pub stt_provider: String,

    /// STT model (e.g. "whisper-1", "nova-2")
    pub stt_model: String,

    /// TTS provider ("openai" or "elevenlabs")
    pub tts_provider: String,

    /// TTS model (e.g. "tts-1")
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f64,
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (chat, Whisper, and TTS)
    pub openai: Option<String>,

    /// `Deepgram` API key (optional STT)
    pub deepgram: Option<String>,

    /// `ElevenLabs` API key (optional TTS)
    pub elevenlabs: Option<String>,
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Path to static files directory (pre-built dashboard bundle)
    pub static_dir: Option<PathBuf>,
}

/// Catalog source file paths for the `ingest` command
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Product catalog JSON
    pub products_file: PathBuf,

    /// Order database JSON
    pub orders_file: PathBuf,

    /// Product FAQs JSON
    pub faqs_file: PathBuf,

    /// Company policy PDF
    pub policy_file: PathBuf,
}

impl Config {
    /// Load configuration (env > TOML file > defaults)
    ///
    /// # Errors
    ///
    /// Returns error if the data directory cannot be created
    pub fn load() -> Result<Self> {
        Self::load_with_options(false)
    }

    /// Load configuration with explicit voice disable option
    ///
    /// # Errors
    ///
    /// Returns error if the data directory cannot be created
    pub fn load_with_options(disable_voice: bool) -> Result<Self> {
        let fc = file::load_config_file();

        // API keys (env > toml > None)
        let api_keys = ApiKeys {
            openai: std::env::var("OPENAI_API_KEY").ok().or(fc.api_keys.openai),
            deepgram: std::env::var("DEEPGRAM_API_KEY")
                .ok()
                .or(fc.api_keys.deepgram),
            elevenlabs: std::env::var("ELEVENLABS_API_KEY")
                .ok()
                .or(fc.api_keys.elevenlabs),
        };

        // LLM config (env > toml > default)
        let llm = LlmConfig {
            base_url: std::env::var("NOVA_LLM_BASE_URL")
                .ok()
                .or(fc.llm.base_url)
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            model: std::env::var("NOVA_LLM_MODEL")
                .ok()
                .or(fc.llm.model)
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            max_tokens: std::env::var("NOVA_LLM_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.llm.max_tokens)
                .unwrap_or(1024),
        };

        // Voice config (env > toml > default)
        let voice_enabled = if disable_voice {
            false
        } else {
            fc.voice.enabled.unwrap_or(true)
        };
        let voice = VoiceConfig {
            enabled: voice_enabled,
            stt_provider: std::env::var("NOVA_STT_PROVIDER")
                .ok()
                .or(fc.voice.stt_provider)
                .unwrap_or_else(|| "whisper".to_string()),
            stt_model: std::env::var("NOVA_STT_MODEL")
                .ok()
                .or(fc.voice.stt_model)
                .unwrap_or_else(|| "whisper-1".to_string()),
            tts_provider: std::env::var("NOVA_TTS_PROVIDER")
                .ok()
                .or(fc.voice.tts_provider)
                .unwrap_or_else(|| "openai".to_string()),
            tts_model: std::env::var("NOVA_TTS_MODEL")
                .ok()
                .or(fc.voice.tts_model)
                .unwrap_or_else(|| "tts-1".to_string()),
            tts_voice: std::env::var("NOVA_TTS_VOICE")
                .ok()
                .or(fc.voice.tts_voice)
                .unwrap_or_else(|| "alloy".to_string()),
            tts_speed: fc.voice.tts_speed.unwrap_or(1.0),
        };

        if disable_voice {
            tracing::info!("voice explicitly disabled via --disable-voice");
        }

        // API server config (env > toml > default)
        let api_server = ApiServerConfig {
            port: std::env::var("NOVA_API_PORT")
                .or_else(|_| std::env::var("PORT"))
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.server.port)
                .unwrap_or(18790),
            static_dir: std::env::var("NOVA_STATIC_DIR")
                .ok()
                .or(fc.server.static_dir)
                .map(PathBuf::from),
        };

        // Catalog sources (toml > default, matching the stock file names)
        let catalog = CatalogConfig {
            products_file: fc
                .catalog
                .products_file
                .map_or_else(|| PathBuf::from("product_catalog.json"), PathBuf::from),
            orders_file: fc
                .catalog
                .orders_file
                .map_or_else(|| PathBuf::from("order_database.json"), PathBuf::from),
            faqs_file: fc
                .catalog
                .faqs_file
                .map_or_else(|| PathBuf::from("product_faqs.json"), PathBuf::from),
            policy_file: fc
                .catalog
                .policy_file
                .map_or_else(|| PathBuf::from("company_policies.pdf"), PathBuf::from),
        };

        // Determine data directory (~/.local/share/nova on Linux)
        let data_dir = std::env::var("NOVA_DATA_DIR").map_or_else(
            |_| {
                directories::BaseDirs::new()
                    .map_or_else(|| PathBuf::from("."), |d| d.data_dir().join("nova"))
            },
            PathBuf::from,
        );
        std::fs::create_dir_all(&data_dir)?;

        Ok(Self {
            data_dir,
            llm,
            voice,
            api_keys,
            api_server,
            catalog,
        })
    }

    /// Path to the gateway database file
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("nova.db")
    }
}
