//! LLM configuration for the mistral.rs backend

/// Quantization type for model weights
#[derive(Clone, Debug, Default)]
pub enum QuantizationType {
    /// No quantization (full precision)
    None,
    /// 4-bit quantization (Q4K)
    #[default]
    Q4K,
    /// 8-bit quantization (Q8_0)
    Q8_0,
    /// 4-bit quantization (Q4_0)
    Q4_0,
}

/// Configuration for the chat engine
#[derive(Clone, Debug)]
pub struct LlmConfig {
    /// Model identifier (HuggingFace model ID or local path)
    pub model_id: String,

    /// Quantization type for model weights
    pub quantization: QuantizationType,

    /// Enable logging of inference details
    pub enable_logging: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model_id: "microsoft/Phi-3.5-mini-instruct".to_string(),
            quantization: QuantizationType::Q4K,
            enable_logging: false,
        }
    }
}

impl LlmConfig {
    /// Create a new configuration with the specified model
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            ..Default::default()
        }
    }

    /// Set the quantization type
    pub fn with_quantization(mut self, quantization: QuantizationType) -> Self {
        self.quantization = quantization;
        self
    }

    /// Enable inference logging
    pub fn with_logging(mut self, enable: bool) -> Self {
        self.enable_logging = enable;
        self
    }
}
