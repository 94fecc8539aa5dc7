//! Sample-rate conversion
//!
//! Mono-only: capture is downmixed before it gets here and synthesis output
//! is mono already.

use crate::{Result, WellspokenError};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

/// Mono audio resampler
pub struct AudioResampler {
    resampler: SincFixedIn<f32>,
    input_rate: u32,
    output_rate: u32,
}

impl AudioResampler {
    /// Create a resampler converting from `input_rate` to `output_rate`
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(WellspokenError::ConfigError(
                "Sample rates must be greater than 0".into(),
            ));
        }

        let ratio = output_rate as f64 / input_rate as f64;

        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, 1024, 1).map_err(|e| {
            WellspokenError::AudioProcessingError(format!("Failed to create resampler: {}", e))
        })?;

        debug!("Created resampler: {} Hz -> {} Hz", input_rate, output_rate);

        Ok(Self {
            resampler,
            input_rate,
            output_rate,
        })
    }

    /// Resample a block of mono samples.
    ///
    /// Full chunks go through `process`; the trailing partial chunk goes
    /// through `process_partial` so no zero-padding leaks into the output.
    pub fn resample(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let ratio = self.output_rate as f64 / self.input_rate as f64;
        let mut output = Vec::with_capacity((input.len() as f64 * ratio) as usize + 64);
        let mut remaining = input;

        loop {
            let needed = self.resampler.input_frames_next();

            if remaining.len() >= needed {
                let (chunk, rest) = remaining.split_at(needed);
                let processed = self
                    .resampler
                    .process(&[chunk.to_vec()], None)
                    .map_err(|e| {
                        WellspokenError::AudioProcessingError(format!("Resampling failed: {}", e))
                    })?;
                output.extend_from_slice(&processed[0]);
                remaining = rest;
            } else {
                let processed = self
                    .resampler
                    .process_partial(Some(&[remaining.to_vec()]), None)
                    .map_err(|e| {
                        WellspokenError::AudioProcessingError(format!("Resampling failed: {}", e))
                    })?;
                output.extend_from_slice(&processed[0]);
                break;
            }
        }

        Ok(output)
    }

    /// Get the input sample rate
    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    /// Get the output sample rate
    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Reset internal filter state (call between utterances)
    pub fn reset(&mut self) {
        self.resampler.reset();
    }
}

/// Resample a block of mono audio in one step.
///
/// Returns the input unchanged when the rates already match.
pub fn resample_audio(input: &[f32], input_rate: u32, output_rate: u32) -> Result<Vec<f32>> {
    if input_rate == output_rate {
        return Ok(input.to_vec());
    }

    let mut resampler = AudioResampler::new(input_rate, output_rate)?;
    resampler.resample(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resampler_creation() {
        assert!(AudioResampler::new(48000, 16000).is_ok());
    }

    #[test]
    fn test_zero_rate_rejected() {
        assert!(AudioResampler::new(0, 16000).is_err());
        assert!(AudioResampler::new(48000, 0).is_err());
    }

    #[test]
    fn test_downsampling_shrinks() {
        let mut resampler = AudioResampler::new(48000, 16000).unwrap();
        let input: Vec<f32> = (0..4800).map(|i| (i as f32 * 0.01).sin()).collect();
        let output = resampler.resample(&input).unwrap();
        assert!(!output.is_empty());
        assert!(output.len() < input.len());
    }

    #[test]
    fn test_upsampling_grows() {
        let mut resampler = AudioResampler::new(16000, 48000).unwrap();
        let input: Vec<f32> = (0..1600).map(|i| (i as f32 * 0.01).sin()).collect();
        let output = resampler.resample(&input).unwrap();
        assert!(output.len() > input.len() * 2);
    }

    #[test]
    fn test_empty_input() {
        let mut resampler = AudioResampler::new(48000, 16000).unwrap();
        assert!(resampler.resample(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_passthrough_when_rates_match() {
        let input = vec![0.5f32; 1000];
        let output = resample_audio(&input, 16000, 16000).unwrap();
        assert_eq!(output, input);
    }
}
