//! Audio plumbing for the speech adapter
//!
//! Microphone capture and speaker playback via cpal, sample-rate conversion
//! via rubato, and Silero voice-activity detection for utterance endpointing.

pub mod input;
pub mod output;
pub mod resampler;
pub mod vad;

pub use input::AudioInput;
pub use output::AudioOutput;
pub use resampler::{resample_audio, AudioResampler};
pub use vad::VoiceActivityDetector;

/// Sample rate Whisper expects for transcription input
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;
