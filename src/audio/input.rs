//! Microphone capture
//!
//! Captures from the default input device and forwards mono f32 chunks over
//! a channel. Samples keep the device's native rate; the speech adapter
//! resamples before feeding VAD or Whisper.

use crate::{Result, WellspokenError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct AudioInput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    is_capturing: Arc<Mutex<bool>>,
}

impl AudioInput {
    /// Create a new audio input with the default input device
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host.default_input_device().ok_or_else(|| {
            WellspokenError::AudioDeviceError("No input device available".into())
        })?;

        info!(
            "Using input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = device
            .default_input_config()
            .map_err(|e| {
                WellspokenError::AudioDeviceError(format!("Failed to get input config: {}", e))
            })?
            .into();

        Ok(Self {
            device,
            config,
            stream: None,
            is_capturing: Arc::new(Mutex::new(false)),
        })
    }

    /// Get the sample rate of the input device
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Get the number of channels of the input device
    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Start capturing and send mono chunks to the provided channel
    pub fn start_capture(&mut self, audio_tx: Sender<Vec<f32>>) -> Result<()> {
        if *self.is_capturing.lock() {
            warn!("Already capturing");
            return Ok(());
        }

        let channels = self.config.channels as usize;
        let is_capturing = Arc::clone(&self.is_capturing);

        let err_fn = |err| {
            error!("Audio input stream error: {}", err);
        };

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if !*is_capturing.lock() {
                        return;
                    }

                    // Downmix interleaved frames to mono
                    let samples: Vec<f32> = if channels == 1 {
                        data.to_vec()
                    } else {
                        data.chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                            .collect()
                    };

                    if let Err(e) = audio_tx.try_send(samples) {
                        debug!("Dropping audio chunk: {}", e);
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| {
                WellspokenError::AudioDeviceError(format!("Failed to build input stream: {}", e))
            })?;

        stream.play().map_err(|e| {
            WellspokenError::AudioDeviceError(format!("Failed to start input stream: {}", e))
        })?;

        *self.is_capturing.lock() = true;
        self.stream = Some(stream);

        debug!("Started microphone capture");
        Ok(())
    }

    /// Stop capturing
    pub fn stop_capture(&mut self) {
        *self.is_capturing.lock() = false;

        if let Some(stream) = self.stream.take() {
            drop(stream);
            debug!("Stopped microphone capture");
        }
    }

    /// Check if currently capturing
    pub fn is_capturing(&self) -> bool {
        *self.is_capturing.lock()
    }
}

impl Drop for AudioInput {
    fn drop(&mut self) {
        self.stop_capture();
    }
}
