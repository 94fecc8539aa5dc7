//! Application configuration
//!
//! Everything is read from the environment once at startup. All variables
//! are required; there are no defaults and no fallback discovery.

use crate::llm::config::LlmConfig;
use crate::speech::stt::WhisperConfig;
use crate::speech::tts::TtsConfig;
use crate::{Result, WellspokenError};
use std::path::{Path, PathBuf};

/// Environment variable holding the SQLite database path
pub const ENV_DATABASE: &str = "WELLSPOKEN_DATABASE";
/// Environment variable holding the Whisper GGML model path
pub const ENV_WHISPER_MODEL: &str = "WELLSPOKEN_WHISPER_MODEL";
/// Environment variable holding the VITS TTS model path
pub const ENV_TTS_MODEL: &str = "WELLSPOKEN_TTS_MODEL";
/// Environment variable holding the VITS tokens file path
pub const ENV_TTS_TOKENS: &str = "WELLSPOKEN_TTS_TOKENS";
/// Environment variable holding the chat model id (or local path)
pub const ENV_LLM_MODEL: &str = "WELLSPOKEN_LLM_MODEL";

/// Configuration for the complete application
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// LLM configuration
    pub llm: LlmConfig,

    /// STT (Whisper) configuration
    pub stt: WhisperConfig,

    /// TTS configuration
    pub tts: TtsConfig,
}

impl AppConfig {
    /// Read the configuration from the process environment.
    ///
    /// Every variable is required; the error names the missing one.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// Factored out of [`AppConfig::from_env`] so tests can supply variables
    /// without mutating the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |name: &str| {
            lookup(name).ok_or_else(|| {
                WellspokenError::ConfigError(format!(
                    "required environment variable {} is not set",
                    name
                ))
            })
        };

        let database_path = PathBuf::from(require(ENV_DATABASE)?);
        let whisper_model = PathBuf::from(require(ENV_WHISPER_MODEL)?);
        let tts_model = require(ENV_TTS_MODEL)?;
        let tts_tokens = require(ENV_TTS_TOKENS)?;
        let llm_model = require(ENV_LLM_MODEL)?;

        let stt = WhisperConfig {
            model_path: whisper_model,
            ..Default::default()
        };

        Ok(Self {
            database_path,
            llm: LlmConfig::new(llm_model),
            stt,
            tts: TtsConfig::new(tts_model, tts_tokens),
        })
    }

    /// Validate that the referenced model files exist.
    ///
    /// The database path is deliberately not checked: SQLite creates it.
    pub fn validate(&self) -> Result<()> {
        if !self.stt.model_path.exists() {
            return Err(WellspokenError::ConfigError(format!(
                "Whisper model not found: {:?}",
                self.stt.model_path
            )));
        }

        if !Path::new(&self.tts.model_path).exists() {
            return Err(WellspokenError::ConfigError(format!(
                "TTS model not found: {}",
                self.tts.model_path
            )));
        }

        if !Path::new(&self.tts.tokens_path).exists() {
            return Err(WellspokenError::ConfigError(format!(
                "TTS tokens file not found: {}",
                self.tts.tokens_path
            )));
        }

        Ok(())
    }
}
