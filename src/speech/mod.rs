//! Speech adapter
//!
//! [`SpeechService`] turns the audio layer plus the STT/TTS engines into the
//! two blocking calls the conversation loop needs: `recognize()` waits for
//! one microphone utterance and returns its transcript, `synthesize()`
//! returns once playback of the given text has finished.
//!
//! Neither call retries; the conversation loop decides what to do with a
//! failure.

pub mod stt;
pub mod tts;

use crate::audio::resampler::{resample_audio, AudioResampler};
use crate::audio::vad::VoiceActivityDetector;
use crate::audio::{AudioInput, AudioOutput, WHISPER_SAMPLE_RATE};
use crate::speech::stt::{WhisperConfig, WhisperEngine};
use crate::speech::tts::{TtsConfig, TtsEngine};
use crate::{RecognitionFailure, Result, WellspokenError};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Voice input/output seam used by the conversation loop.
///
/// Production code uses [`SpeechService`]; tests script this trait.
pub trait SpeechIo {
    /// Block on one microphone utterance and return the recognized text
    fn recognize(&mut self) -> Result<String>;

    /// Block until the given text has been spoken in full
    fn synthesize(&mut self, text: &str) -> Result<()>;
}

/// Endpointing parameters for [`SpeechService::recognize`]
#[derive(Clone, Debug)]
pub struct SpeechConfig {
    /// VAD speech probability threshold
    pub vad_threshold: f32,

    /// Trailing silence that ends an utterance (seconds)
    pub silence_threshold: f32,

    /// How long to wait for speech to start before giving up (seconds)
    pub no_speech_timeout: f32,

    /// Hard cap on utterance length (seconds)
    pub max_utterance: f32,

    /// Utterances shorter than this are treated as noise (seconds)
    pub min_utterance: f32,

    /// Audio kept from just before speech onset (VAD chunks)
    pub preroll_chunks: usize,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            vad_threshold: 0.5,
            silence_threshold: 0.8,
            no_speech_timeout: 8.0,
            max_utterance: 30.0,
            min_utterance: 0.3,
            preroll_chunks: 10,
        }
    }
}

/// Blocking speech recognition and synthesis over local models
pub struct SpeechService {
    input: AudioInput,
    output: AudioOutput,
    stt: WhisperEngine,
    tts: TtsEngine,
    vad: VoiceActivityDetector,
    config: SpeechConfig,
    speaker_id: i32,
}

impl SpeechService {
    /// Open the audio devices and load both speech models.
    ///
    /// Fails up front if there is no microphone or speaker, so the caller
    /// can fall back to text mode.
    pub fn new(stt_config: WhisperConfig, tts_config: TtsConfig) -> Result<Self> {
        Self::with_config(stt_config, tts_config, SpeechConfig::default())
    }

    /// Like [`SpeechService::new`] with explicit endpointing parameters
    pub fn with_config(
        stt_config: WhisperConfig,
        tts_config: TtsConfig,
        config: SpeechConfig,
    ) -> Result<Self> {
        let input = AudioInput::new()?;
        let mut output = AudioOutput::new()?;
        output.start()?;

        let stt = WhisperEngine::new(stt_config)?;
        let speaker_id = tts_config.speaker_id;
        let tts = TtsEngine::new(&tts_config)?;
        let vad = VoiceActivityDetector::new(WHISPER_SAMPLE_RATE, config.vad_threshold)?;

        info!(
            "Speech service ready (mic {} Hz, speaker {} Hz)",
            input.sample_rate(),
            output.sample_rate()
        );

        Ok(Self {
            input,
            output,
            stt,
            tts,
            vad,
            config,
            speaker_id,
        })
    }

    /// Capture one utterance, endpointed by VAD, and return its samples at
    /// the Whisper sample rate.
    fn capture_utterance(&mut self) -> Result<Vec<f32>> {
        let device_rate = self.input.sample_rate();
        let mut resampler = if device_rate != WHISPER_SAMPLE_RATE {
            Some(AudioResampler::new(device_rate, WHISPER_SAMPLE_RATE)?)
        } else {
            None
        };

        let (audio_tx, audio_rx) = bounded::<Vec<f32>>(64);
        self.input.start_capture(audio_tx)?;
        self.vad.reset();

        // The endpointing loop reports failure as a value; capture must be
        // stopped before surfacing it, or the stream would stay wired to a
        // dead channel and starve every later utterance
        let outcome = endpoint_utterance(
            &audio_rx,
            &mut self.vad,
            resampler.as_mut(),
            &self.config,
        );
        self.input.stop_capture();

        let utterance = outcome?;
        let duration = utterance.len() as f32 / WHISPER_SAMPLE_RATE as f32;
        debug!("Captured utterance: {:.2}s", duration);

        if duration < self.config.min_utterance {
            return Err(RecognitionFailure::NoMatch.into());
        }

        Ok(utterance)
    }
}

/// VAD endpointing over chunks arriving on `audio_rx`.
///
/// Chunks are resampled to the Whisper rate when a resampler is given.
/// Never early-returns: every failure comes back as a value, so the caller
/// can shut capture down before propagating it.
fn endpoint_utterance(
    audio_rx: &Receiver<Vec<f32>>,
    vad: &mut VoiceActivityDetector,
    mut resampler: Option<&mut AudioResampler>,
    config: &SpeechConfig,
) -> Result<Vec<f32>> {
    let chunk_size = vad.chunk_size();
    let chunk_secs = chunk_size as f32 / WHISPER_SAMPLE_RATE as f32;
    let max_silence_chunks = (config.silence_threshold / chunk_secs).ceil() as usize;
    let max_utterance_samples = (config.max_utterance * WHISPER_SAMPLE_RATE as f32) as usize;

    let started = Instant::now();
    let mut pending: Vec<f32> = Vec::new();
    let mut preroll: Vec<f32> = Vec::new();
    let mut utterance: Vec<f32> = Vec::new();
    let mut heard_speech = false;
    let mut silence_chunks = 0usize;
    let mut last_chunk_at = Instant::now();

    loop {
        // Give up if the user never starts talking
        if !heard_speech && started.elapsed().as_secs_f32() > config.no_speech_timeout {
            break Err(RecognitionFailure::NoMatch.into());
        }

        match audio_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(chunk) => {
                last_chunk_at = Instant::now();
                let chunk = match resampler.as_mut() {
                    Some(r) => match r.resample(&chunk) {
                        Ok(resampled) => resampled,
                        Err(e) => break Err(e),
                    },
                    None => chunk,
                };
                pending.extend_from_slice(&chunk);
            }
            Err(RecvTimeoutError::Timeout) => {
                // Capture stalling mid-utterance is a transient cancel
                if heard_speech && last_chunk_at.elapsed() > Duration::from_secs(2) {
                    break Err(RecognitionFailure::Cancelled {
                        reason: "microphone stream stalled".into(),
                        transient: true,
                    }
                    .into());
                }
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => {
                break Err(RecognitionFailure::Cancelled {
                    reason: "microphone stream closed".into(),
                    transient: false,
                }
                .into());
            }
        }

        let mut ended = false;
        while pending.len() >= chunk_size {
            let chunk: Vec<f32> = pending.drain(..chunk_size).collect();

            if vad.is_speech(&chunk) {
                if !heard_speech {
                    heard_speech = true;
                    utterance.extend_from_slice(&preroll);
                    preroll.clear();
                    debug!("Speech onset detected");
                }
                silence_chunks = 0;
                utterance.extend_from_slice(&chunk);
            } else if heard_speech {
                silence_chunks += 1;
                utterance.extend_from_slice(&chunk);
                if silence_chunks >= max_silence_chunks {
                    ended = true;
                    break;
                }
            } else {
                preroll.extend_from_slice(&chunk);
                let max_preroll = config.preroll_chunks * chunk_size;
                if preroll.len() > max_preroll {
                    let excess = preroll.len() - max_preroll;
                    preroll.drain(..excess);
                }
            }
        }

        if ended || utterance.len() >= max_utterance_samples {
            break Ok(utterance);
        }
    }
}

impl SpeechIo for SpeechService {
    fn recognize(&mut self) -> Result<String> {
        let samples = self.capture_utterance()?;

        let text = self.stt.transcribe(&samples)?;
        if text.is_empty() {
            return Err(RecognitionFailure::NoMatch.into());
        }

        Ok(text)
    }

    fn synthesize(&mut self, text: &str) -> Result<()> {
        let (samples, sample_rate) = self.tts.synthesize(text, self.speaker_id)?;
        if samples.is_empty() {
            return Ok(());
        }

        let device_rate = self.output.sample_rate();
        let samples = resample_audio(&samples, sample_rate, device_rate)?;

        self.output.start()?;
        self.output.enqueue(&samples);

        // Block until the queue drains, then a short tail so the device
        // buffer finishes too
        let duration = samples.len() as f32 / device_rate as f32;
        let deadline = Instant::now() + Duration::from_secs_f32(duration + 5.0);
        while self.output.pending_samples() > 0 {
            if Instant::now() > deadline {
                self.output.clear();
                warn!("Playback did not drain in time");
                return Err(WellspokenError::SynthesisError(
                    "playback cancelled: output stream stalled".into(),
                ));
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        std::thread::sleep(Duration::from_millis(50));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpointing_surfaces_closed_channel_as_value() {
        let mut vad = VoiceActivityDetector::new(WHISPER_SAMPLE_RATE, 0.5).unwrap();
        let (tx, rx) = bounded::<Vec<f32>>(4);
        drop(tx);

        // A dead capture channel must come back as an error value, not hang
        // or panic, so the caller can stop the input stream first
        let err = endpoint_utterance(&rx, &mut vad, None, &SpeechConfig::default()).unwrap_err();
        match err {
            WellspokenError::RecognitionError(RecognitionFailure::Cancelled {
                transient, ..
            }) => assert!(!transient),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_endpointing_times_out_when_nothing_arrives() {
        let mut vad = VoiceActivityDetector::new(WHISPER_SAMPLE_RATE, 0.5).unwrap();
        let (_tx, rx) = bounded::<Vec<f32>>(4);

        let config = SpeechConfig {
            no_speech_timeout: 0.3,
            ..Default::default()
        };

        let err = endpoint_utterance(&rx, &mut vad, None, &config).unwrap_err();
        assert!(matches!(
            err,
            WellspokenError::RecognitionError(RecognitionFailure::NoMatch)
        ));
    }
}
