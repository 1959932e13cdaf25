//! Voice processing module
//!
//! Handles audio capture, utterance segmentation, playback, and the
//! hosted STT/TTS clients used by the daemon loop.

mod capture;
mod playback;
mod segmenter;
mod stt;
mod tts;

pub use capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
pub use playback::AudioPlayback;
pub use segmenter::{SegmenterState, SpeechSegmenter};
pub use stt::{SpeechToText, SttProvider};
pub use tts::{TextToSpeech, TtsProvider};
