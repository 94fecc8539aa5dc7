//! Voice activity detection (Silero VAD)
//!
//! Used by the speech adapter to find where an utterance starts and stops.

use crate::{Result, WellspokenError};
use tracing::debug;
use voice_activity_detector::VoiceActivityDetector as SileroVad;

/// Chunk size Silero expects at 16 kHz (32 ms)
pub const VAD_CHUNK_SIZE: usize = 512;

pub struct VoiceActivityDetector {
    detector: SileroVad,
    sample_rate: u32,
    threshold: f32,
}

impl VoiceActivityDetector {
    /// Create a VAD instance.
    ///
    /// `sample_rate` must be 8000 or 16000; `threshold` is the speech
    /// probability above which a chunk counts as speech.
    pub fn new(sample_rate: u32, threshold: f32) -> Result<Self> {
        if ![8000, 16000].contains(&sample_rate) {
            return Err(WellspokenError::ConfigError(format!(
                "Invalid VAD sample rate: {}. Must be 8000 or 16000",
                sample_rate
            )));
        }

        let chunk_size: usize = match sample_rate {
            8000 => 256,
            _ => VAD_CHUNK_SIZE,
        };

        let detector = SileroVad::builder()
            .sample_rate(sample_rate as i32)
            .chunk_size(chunk_size)
            .build()
            .map_err(|e| {
                WellspokenError::AudioProcessingError(format!("Failed to create VAD: {:?}", e))
            })?;

        debug!(
            "Initialized VAD: sample rate {}, threshold {}",
            sample_rate, threshold
        );

        Ok(Self {
            detector,
            sample_rate,
            threshold,
        })
    }

    /// Whether this chunk contains speech
    pub fn is_speech(&mut self, chunk: &[f32]) -> bool {
        self.detector.predict(chunk.iter().copied()) >= self.threshold
    }

    /// Reset detector state between utterances
    pub fn reset(&mut self) {
        self.detector.reset();
    }

    /// Chunk size the detector expects, in samples
    pub fn chunk_size(&self) -> usize {
        match self.sample_rate {
            8000 => 256,
            _ => VAD_CHUNK_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unsupported_sample_rate() {
        assert!(VoiceActivityDetector::new(44100, 0.5).is_err());
        assert!(VoiceActivityDetector::new(0, 0.5).is_err());
    }

    #[test]
    fn test_chunk_size_matches_sample_rate() {
        let vad = VoiceActivityDetector::new(16000, 0.5).unwrap();
        assert_eq!(vad.chunk_size(), VAD_CHUNK_SIZE);

        let vad = VoiceActivityDetector::new(8000, 0.5).unwrap();
        assert_eq!(vad.chunk_size(), 256);
    }
}
