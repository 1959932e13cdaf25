//! TOML configuration file loading
//!
//! Supports `~/.config/nova/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct NovaConfigFile {
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Catalog source files
    #[serde(default)]
    pub catalog: CatalogFileConfig,
}

/// LLM-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Model identifier (e.g. "gpt-4o-mini")
    pub model: Option<String>,

    /// Base URL of an OpenAI-compatible endpoint
    pub base_url: Option<String>,

    /// Max tokens per completion
    pub max_tokens: Option<u32>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Enable voice input/output
    pub enabled: Option<bool>,

    /// STT provider ("whisper" or "deepgram")
    pub stt_provider: Option<String>,

    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// TTS provider ("openai" or "elevenlabs")
    pub tts_provider: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f64>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub deepgram: Option<String>,
    pub elevenlabs: Option<String>,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,

    /// Path to a pre-built dashboard bundle to serve
    pub static_dir: Option<String>,
}

/// Catalog source file paths
#[derive(Debug, Default, Deserialize)]
pub struct CatalogFileConfig {
    pub products_file: Option<String>,
    pub orders_file: Option<String>,
    pub faqs_file: Option<String>,
    pub policy_file: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `NovaConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> NovaConfigFile {
    let Some(path) = config_file_path() else {
        return NovaConfigFile::default();
    };

    if !path.exists() {
        return NovaConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                NovaConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            NovaConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/nova/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("nova").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_file() {
        let content = r#"
            [llm]
            model = "gpt-4o-mini"

            [voice]
            tts_voice = "nova"
        "#;

        let config: NovaConfigFile = toml::from_str(content).unwrap();
        assert_eq!(config.llm.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.voice.tts_voice.as_deref(), Some("nova"));
        assert!(config.server.port.is_none());
    }

    #[test]
    fn test_parse_empty_file() {
        let config: NovaConfigFile = toml::from_str("").unwrap();
        assert!(config.llm.model.is_none());
        assert!(config.catalog.products_file.is_none());
    }
}
