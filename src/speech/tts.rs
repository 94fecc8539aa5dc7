//! Text-to-speech via sherpa-rs (VITS models)

use crate::{Result, WellspokenError};
use sherpa_rs::tts::{VitsTts, VitsTtsConfig};
use std::path::Path;
use tracing::{debug, info};

/// Configuration for the TTS engine
#[derive(Clone, Debug)]
pub struct TtsConfig {
    /// Path to the ONNX model file
    pub model_path: String,

    /// Path to the tokens file
    pub tokens_path: String,

    /// Path to the lexicon file (optional for some models)
    pub lexicon_path: Option<String>,

    /// Path to the espeak-ng data directory (optional)
    pub data_dir: Option<String>,

    /// Length scale for speech rate (1.0 = normal, <1.0 = faster)
    pub length_scale: f32,

    /// Noise scale for variation
    pub noise_scale: f32,

    /// Noise scale width
    pub noise_scale_w: f32,

    /// Speaker ID for multi-speaker models
    pub speaker_id: i32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            model_path: String::new(),
            tokens_path: String::new(),
            lexicon_path: None,
            data_dir: None,
            length_scale: 1.0,
            noise_scale: 0.667,
            noise_scale_w: 0.8,
            speaker_id: 0,
        }
    }
}

impl TtsConfig {
    /// Create a new TTS config with required paths
    pub fn new(model_path: impl Into<String>, tokens_path: impl Into<String>) -> Self {
        Self {
            model_path: model_path.into(),
            tokens_path: tokens_path.into(),
            ..Default::default()
        }
    }
}

/// TTS engine wrapping sherpa-rs VitsTts
pub struct TtsEngine {
    tts: VitsTts,
}

impl TtsEngine {
    /// Load the VITS model
    pub fn new(config: &TtsConfig) -> Result<Self> {
        if config.model_path.is_empty() {
            return Err(WellspokenError::ConfigError(
                "TTS model path is required".into(),
            ));
        }

        if !Path::new(&config.model_path).exists() {
            return Err(WellspokenError::ModelLoadError(format!(
                "TTS model not found: {}",
                config.model_path
            )));
        }

        if !Path::new(&config.tokens_path).exists() {
            return Err(WellspokenError::ModelLoadError(format!(
                "TTS tokens file not found: {}",
                config.tokens_path
            )));
        }

        info!("Loading VITS TTS model from: {}", config.model_path);

        let vits_config = VitsTtsConfig {
            model: config.model_path.clone(),
            tokens: config.tokens_path.clone(),
            lexicon: config.lexicon_path.clone().unwrap_or_default(),
            data_dir: config.data_dir.clone().unwrap_or_default(),
            length_scale: config.length_scale,
            noise_scale: config.noise_scale,
            noise_scale_w: config.noise_scale_w,
            ..Default::default()
        };

        let tts = VitsTts::new(vits_config);

        info!("TTS engine initialized");

        Ok(Self { tts })
    }

    /// Synthesize text into mono f32 samples.
    ///
    /// Returns the samples and their native sample rate. Empty or
    /// whitespace-only text yields no samples.
    pub fn synthesize(&mut self, text: &str, speaker_id: i32) -> Result<(Vec<f32>, u32)> {
        let text = text.trim();
        if text.is_empty() {
            return Ok((Vec::new(), 0));
        }

        debug!("Synthesizing: {}", text);

        let audio = self
            .tts
            .create(text, speaker_id, 1.0)
            .map_err(|e| WellspokenError::SynthesisError(format!("Synthesis failed: {}", e)))?;

        debug!(
            "Synthesized {} samples at {} Hz",
            audio.samples.len(),
            audio.sample_rate
        );

        Ok((audio.samples, audio.sample_rate as u32))
    }
}
