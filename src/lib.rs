pub mod audio;
pub mod config;
pub mod conversation;
pub mod db;
pub mod llm;
pub mod speech;

use thiserror::Error;

/// Why a recognition attempt failed.
///
/// `NoMatch` means the microphone was open but nothing recognizable was
/// said. `Cancelled` means capture or the engine was cut short; `transient`
/// distinguishes a retryable hiccup from a service-level failure.
#[derive(Error, Debug, Clone)]
pub enum RecognitionFailure {
    #[error("no speech was recognized")]
    NoMatch,

    #[error("recognition was cancelled: {reason}")]
    Cancelled { reason: String, transient: bool },
}

#[derive(Error, Debug, Clone)]
pub enum WellspokenError {
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Model load error: {0}")]
    ModelLoadError(String),

    #[error("Recognition error: {0}")]
    RecognitionError(#[from] RecognitionFailure),

    #[error("Synthesis error: {0}")]
    SynthesisError(String),

    #[error("Transcription error: {0}")]
    TranscriptionError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for WellspokenError {
    fn from(e: std::io::Error) -> Self {
        WellspokenError::IOError(e.to_string())
    }
}

impl WellspokenError {
    /// Check if this error is recoverable within a single conversation turn
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Hardware/device errors may require user intervention
            WellspokenError::AudioDeviceError(_) => false,
            // Model errors require restarting
            WellspokenError::ModelLoadError(_) => false,
            WellspokenError::RecognitionError(RecognitionFailure::NoMatch) => true,
            WellspokenError::RecognitionError(RecognitionFailure::Cancelled {
                transient, ..
            }) => *transient,
            WellspokenError::SynthesisError(_) => true,
            WellspokenError::TranscriptionError(_) => true,
            WellspokenError::InferenceError(_) => true,
            WellspokenError::DatabaseError(_) => true,
            WellspokenError::AudioProcessingError(_) => true,
            WellspokenError::ConfigError(_) => false,
            WellspokenError::IOError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            WellspokenError::AudioDeviceError(_) => {
                "Audio device error. Please check your microphone/speakers.".to_string()
            }
            WellspokenError::ModelLoadError(_) => {
                "Failed to load a model. Please verify model files are present.".to_string()
            }
            WellspokenError::RecognitionError(_) | WellspokenError::TranscriptionError(_) => {
                "Speech recognition failed. Please try again.".to_string()
            }
            WellspokenError::SynthesisError(_) => {
                "Text-to-speech failed. Response will be shown as text.".to_string()
            }
            WellspokenError::InferenceError(_) => {
                "Response generation failed. Please try again.".to_string()
            }
            WellspokenError::DatabaseError(_) => {
                "The database could not be reached. Please try again.".to_string()
            }
            WellspokenError::AudioProcessingError(_) => {
                "Audio processing failed. Please try again.".to_string()
            }
            WellspokenError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            WellspokenError::IOError(_) => "File system error occurred.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WellspokenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognition_failure_recoverability() {
        let no_match = WellspokenError::RecognitionError(RecognitionFailure::NoMatch);
        assert!(no_match.is_recoverable());

        let transient = WellspokenError::RecognitionError(RecognitionFailure::Cancelled {
            reason: "stream stalled".into(),
            transient: true,
        });
        assert!(transient.is_recoverable());

        let fatal = WellspokenError::RecognitionError(RecognitionFailure::Cancelled {
            reason: "device lost".into(),
            transient: false,
        });
        assert!(!fatal.is_recoverable());
    }

    #[test]
    fn test_config_errors_are_not_recoverable() {
        assert!(!WellspokenError::ConfigError("missing var".into()).is_recoverable());
        assert!(!WellspokenError::ModelLoadError("no file".into()).is_recoverable());
    }

    #[test]
    fn test_user_messages_are_nonempty() {
        let errors = [
            WellspokenError::AudioDeviceError("x".into()),
            WellspokenError::DatabaseError("x".into()),
            WellspokenError::InferenceError("x".into()),
            WellspokenError::SynthesisError("x".into()),
        ];
        for e in errors {
            assert!(!e.user_message().is_empty());
        }
    }
}
