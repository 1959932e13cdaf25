//! Utterance segmentation
//!
//! Splits the microphone stream into silence-delimited utterances
//! using RMS energy, so each spoken question reaches the transcriber
//! as one unit. There is no wake word; any sustained speech opens a
//! segment.

/// Minimum audio energy threshold to consider speech
const ENERGY_THRESHOLD: f32 = 0.03;

/// Minimum amount of actual speech to accept an utterance (in samples at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800; // 0.3 seconds

/// Silence duration to consider end of utterance (in samples)
const SILENCE_SAMPLES: usize = 8000; // 0.5 seconds

/// State of the speech segmenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterState {
    /// Waiting for speech
    Idle,
    /// Detected potential speech, accumulating
    Listening,
}

/// Segments microphone audio into utterances
pub struct SpeechSegmenter {
    state: SegmenterState,
    speech_buffer: Vec<f32>,
    /// Samples above the energy threshold in the current segment
    speech_samples: usize,
    silence_counter: usize,
}

impl Default for SpeechSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechSegmenter {
    /// Create a new speech segmenter
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SegmenterState::Idle,
            speech_buffer: Vec::new(),
            speech_samples: 0,
            silence_counter: 0,
        }
    }

    /// Process audio samples
    ///
    /// Returns true when a complete utterance is buffered: enough
    /// speech followed by enough silence. Take it with
    /// [`Self::take_utterance`].
    pub fn process(&mut self, samples: &[f32]) -> bool {
        let energy = calculate_energy(samples);
        let is_speech = energy > ENERGY_THRESHOLD;

        match self.state {
            SegmenterState::Idle => {
                if is_speech {
                    self.state = SegmenterState::Listening;
                    self.speech_buffer.clear();
                    self.speech_buffer.extend_from_slice(samples);
                    self.speech_samples = samples.len();
                    self.silence_counter = 0;
                    tracing::trace!(energy, "speech detected, listening");
                }
            }
            SegmenterState::Listening => {
                self.speech_buffer.extend_from_slice(samples);

                if is_speech {
                    self.speech_samples += samples.len();
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }

                tracing::trace!(
                    buffer_len = self.speech_buffer.len(),
                    speech = self.speech_samples,
                    silence = self.silence_counter,
                    energy,
                    "listening state"
                );

                // Enough speech followed by silence completes the utterance
                if self.silence_counter > SILENCE_SAMPLES
                    && self.speech_samples > MIN_SPEECH_SAMPLES
                {
                    tracing::debug!(samples = self.speech_buffer.len(), "utterance complete");
                    return true;
                }

                // Timeout: too much silence without enough speech
                if self.silence_counter > SILENCE_SAMPLES * 2 {
                    tracing::trace!("timeout - resetting");
                    self.reset();
                }
            }
        }

        false
    }

    /// Get the accumulated speech buffer
    #[must_use]
    pub fn speech_buffer(&self) -> &[f32] {
        &self.speech_buffer
    }

    /// Take the buffered utterance, resetting the segmenter
    pub fn take_utterance(&mut self) -> Vec<f32> {
        let utterance = std::mem::take(&mut self.speech_buffer);
        self.reset();
        utterance
    }

    /// Check if currently accumulating speech
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.state == SegmenterState::Listening
    }

    /// Reset the segmenter to idle
    pub fn reset(&mut self) {
        self.state = SegmenterState::Idle;
        self.speech_buffer.clear();
        self.speech_samples = 0;
        self.silence_counter = 0;
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> SegmenterState {
        self.state
    }
}

/// Calculate RMS energy of audio samples
#[allow(clippy::cast_precision_loss)]
fn calculate_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_calculation() {
        let silence = vec![0.0f32; 100];
        assert!(calculate_energy(&silence) < 0.001);

        let loud = vec![0.5f32; 100];
        assert!(calculate_energy(&loud) > 0.4);
    }

    #[test]
    fn test_silence_does_not_open_a_segment() {
        let mut segmenter = SpeechSegmenter::new();
        assert!(!segmenter.process(&vec![0.0f32; 1600]));
        assert_eq!(segmenter.state(), SegmenterState::Idle);
    }

    #[test]
    fn test_speech_then_silence_completes() {
        let mut segmenter = SpeechSegmenter::new();

        // 0.5s of speech
        segmenter.process(&vec![0.3f32; 8000]);
        assert_eq!(segmenter.state(), SegmenterState::Listening);

        // 0.6s of silence completes the utterance
        let complete = segmenter.process(&vec![0.0f32; 9600]);
        assert!(complete);

        let utterance = segmenter.take_utterance();
        assert_eq!(utterance.len(), 8000 + 9600);
        assert_eq!(segmenter.state(), SegmenterState::Idle);
    }

    #[test]
    fn test_short_blip_times_out() {
        let mut segmenter = SpeechSegmenter::new();

        // 0.1s of speech, below the minimum
        segmenter.process(&vec![0.3f32; 1600]);
        assert!(segmenter.is_listening());

        // Prolonged silence resets without completing
        let complete = segmenter.process(&vec![0.0f32; SILENCE_SAMPLES * 2 + 1600]);
        assert!(!complete);
        assert_eq!(segmenter.state(), SegmenterState::Idle);
        assert!(segmenter.speech_buffer().is_empty());
    }

    #[test]
    fn test_pause_mid_sentence_does_not_split() {
        let mut segmenter = SpeechSegmenter::new();

        // speech, short pause, speech again
        segmenter.process(&vec![0.3f32; 6400]);
        assert!(!segmenter.process(&vec![0.0f32; 3200]));
        assert!(!segmenter.process(&vec![0.3f32; 6400]));
        assert!(segmenter.is_listening());

        // only sustained silence ends the utterance
        assert!(segmenter.process(&vec![0.0f32; 9600]));
    }
}
