//! Speech-to-text via whisper.cpp

use crate::{Result, WellspokenError};
use std::path::PathBuf;
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Configuration for the Whisper speech-to-text engine
#[derive(Clone, Debug)]
pub struct WhisperConfig {
    /// Path to the Whisper GGML model file
    pub model_path: PathBuf,

    /// Language to transcribe (None for auto-detection)
    pub language: Option<String>,

    /// Number of threads to use for transcription
    pub n_threads: i32,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            language: Some("en".to_string()),
            n_threads: 4,
        }
    }
}

/// Whisper speech-to-text engine
pub struct WhisperEngine {
    config: WhisperConfig,
    context: WhisperContext,
}

impl WhisperEngine {
    /// Load the Whisper model
    pub fn new(config: WhisperConfig) -> Result<Self> {
        info!("Loading Whisper model from: {:?}", config.model_path);

        if !config.model_path.exists() {
            return Err(WellspokenError::ModelLoadError(format!(
                "Model file not found: {:?}",
                config.model_path
            )));
        }

        let context = WhisperContext::new_with_params(
            config.model_path.to_str().ok_or_else(|| {
                WellspokenError::ModelLoadError("Invalid model path".to_string())
            })?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| {
            WellspokenError::ModelLoadError(format!("Failed to load Whisper model: {:?}", e))
        })?;

        info!("Whisper model loaded");

        Ok(Self { config, context })
    }

    /// Transcribe a complete utterance (mono f32 samples at 16 kHz).
    ///
    /// Returns the trimmed transcript, which may be empty if Whisper heard
    /// nothing intelligible.
    pub fn transcribe(&self, samples: &[f32]) -> Result<String> {
        if samples.is_empty() {
            return Err(WellspokenError::TranscriptionError(
                "Empty audio segment".to_string(),
            ));
        }

        debug!(
            "Transcribing {} samples ({:.2}s)",
            samples.len(),
            samples.len() as f32 / 16000.0
        );

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_n_threads(self.config.n_threads);
        params.set_translate(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        if let Some(ref lang) = self.config.language {
            params.set_language(Some(lang));
        }

        let mut state = self.context.create_state().map_err(|e| {
            WellspokenError::TranscriptionError(format!("Failed to create state: {:?}", e))
        })?;

        state.full(params, samples).map_err(|e| {
            WellspokenError::TranscriptionError(format!("Transcription failed: {:?}", e))
        })?;

        let num_segments = state.full_n_segments().map_err(|e| {
            WellspokenError::TranscriptionError(format!("Failed to get segments: {:?}", e))
        })?;

        let mut text = String::new();
        for i in 0..num_segments {
            let segment = state.full_get_segment_text(i).map_err(|e| {
                WellspokenError::TranscriptionError(format!(
                    "Failed to get segment text: {:?}",
                    e
                ))
            })?;
            text.push_str(&segment);
        }

        let text = text.trim().to_string();
        debug!("Transcription result: '{}'", text);

        Ok(text)
    }
}
