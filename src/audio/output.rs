//! Speaker playback
//!
//! A persistent output stream drains a shared sample queue and emits
//! silence when the queue is empty. `synthesize` blocks by enqueueing audio
//! and polling [`AudioOutput::pending_samples`] until the queue drains.

use crate::{Result, WellspokenError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, error, info};

pub struct AudioOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    queue: Arc<Mutex<VecDeque<f32>>>,
}

impl AudioOutput {
    /// Create a new audio output with the default output device
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host.default_output_device().ok_or_else(|| {
            WellspokenError::AudioDeviceError("No output device available".into())
        })?;

        info!(
            "Using output device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = device
            .default_output_config()
            .map_err(|e| {
                WellspokenError::AudioDeviceError(format!("Failed to get output config: {}", e))
            })?
            .into();

        Ok(Self {
            device,
            config,
            stream: None,
            queue: Arc::new(Mutex::new(VecDeque::new())),
        })
    }

    /// Get the sample rate of the output device
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Start the playback stream.
    ///
    /// Idempotent; the stream keeps running and plays whatever is enqueued.
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let channels = self.config.channels as usize;
        let queue = Arc::clone(&self.queue);

        let err_fn = |err| {
            error!("Audio output stream error: {}", err);
        };

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut queue = queue.lock();
                    for frame in data.chunks_mut(channels) {
                        let sample = queue.pop_front().unwrap_or(0.0);
                        for slot in frame.iter_mut() {
                            *slot = sample;
                        }
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| {
                WellspokenError::AudioDeviceError(format!("Failed to build output stream: {}", e))
            })?;

        stream.play().map_err(|e| {
            WellspokenError::AudioDeviceError(format!("Failed to start output stream: {}", e))
        })?;

        self.stream = Some(stream);
        debug!("Started playback stream");
        Ok(())
    }

    /// Enqueue mono samples for playback.
    ///
    /// Samples must already be at the device sample rate.
    pub fn enqueue(&self, samples: &[f32]) {
        self.queue.lock().extend(samples.iter().copied());
    }

    /// Number of samples still waiting to be played
    pub fn pending_samples(&self) -> usize {
        self.queue.lock().len()
    }

    /// Drop anything not yet played
    pub fn clear(&self) {
        self.queue.lock().clear();
    }

    /// Stop the playback stream
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            debug!("Stopped playback stream");
        }
        self.clear();
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        self.stop();
    }
}
