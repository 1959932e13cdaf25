//! Text-to-speech (TTS) processing

use crate::config::{ApiKeys, VoiceConfig};
use crate::{Error, Result};

/// TTS provider backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TtsProvider {
    OpenAI,
    ElevenLabs,
}

/// Synthesizes speech from text
pub struct TextToSpeech {
    client: reqwest::Client,
    api_key: String,
    voice: String,
    speed: f64,
    model: String,
    provider: TtsProvider,
}

impl TextToSpeech {
    /// Create a TTS instance from the voice configuration
    ///
    /// # Errors
    ///
    /// Returns error if the configured provider has no API key
    pub fn from_config(voice: &VoiceConfig, keys: &ApiKeys) -> Result<Self> {
        match voice.tts_provider.as_str() {
            "elevenlabs" => Self::new(
                TtsProvider::ElevenLabs,
                keys.elevenlabs.clone().unwrap_or_default(),
                voice.tts_voice.clone(),
                voice.tts_speed,
                voice.tts_model.clone(),
            ),
            _ => Self::new(
                TtsProvider::OpenAI,
                keys.openai.clone().unwrap_or_default(),
                voice.tts_voice.clone(),
                voice.tts_speed,
                voice.tts_model.clone(),
            ),
        }
    }

    /// Create a new TTS instance
    ///
    /// For ElevenLabs, `voice` is the voice ID and `speed` is ignored.
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(
        provider: TtsProvider,
        api_key: String,
        voice: String,
        speed: f64,
        model: String,
    ) -> Result<Self> {
        if api_key.is_empty() {
            let name = match provider {
                TtsProvider::OpenAI => "OpenAI API key required for TTS",
                TtsProvider::ElevenLabs => "ElevenLabs API key required for TTS",
            };
            return Err(Error::Config(name.to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            voice,
            speed,
            model,
            provider,
        })
    }

    /// Synthesize text to speech
    ///
    /// # Arguments
    ///
    /// * `text` - Text to synthesize
    ///
    /// # Returns
    ///
    /// Audio bytes (MP3 format)
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        match self.provider {
            TtsProvider::OpenAI => self.synthesize_openai(text).await,
            TtsProvider::ElevenLabs => self.synthesize_elevenlabs(text).await,
        }
    }

    /// Synthesize using OpenAI TTS
    async fn synthesize_openai(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f64,
        }

        let request = TtsRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: self.speed,
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("OpenAI TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        Ok(audio.to_vec())
    }

    /// Synthesize using ElevenLabs TTS
    async fn synthesize_elevenlabs(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct ElevenLabsRequest<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        let url = format!(
            "https://api.elevenlabs.io/v1/text-to-speech/{}",
            self.voice
        );

        let request = ElevenLabsRequest {
            text,
            model_id: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("ElevenLabs TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_a_config_error() {
        let result = TextToSpeech::new(
            TtsProvider::OpenAI,
            String::new(),
            "alloy".into(),
            1.0,
            "tts-1".into(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_provider_selected_from_config() {
        let voice = VoiceConfig {
            tts_provider: "elevenlabs".to_string(),
            tts_model: "eleven_monolingual_v1".to_string(),
            tts_voice: "voice-id".to_string(),
            tts_speed: 1.0,
            ..VoiceConfig::default()
        };
        let keys = ApiKeys {
            elevenlabs: Some("xi-test".to_string()),
            ..ApiKeys::default()
        };

        let tts = TextToSpeech::from_config(&voice, &keys).unwrap();
        assert_eq!(tts.provider, TtsProvider::ElevenLabs);
    }
}
