//! Microphone capture via `cpal`.
//!
//! One [`CapturePort::listen`] call is one bounded-duration listen: wait
//! up to `timeout` for speech to start (RMS over a small threshold), then
//! record until a trailing-silence hold or the utterance cap. Returns
//! `None` when nothing was heard — the session decides whether to
//! re-listen. Latch discipline lives with the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};

use async_trait::async_trait;
use avatar_core::ports::{AudioClip, CapturePort, GatewayError};

/// RMS level above which a chunk counts as speech.
const SPEECH_RMS_THRESHOLD: f32 = 0.012;

/// Trailing silence that ends an utterance.
const SILENCE_HOLD: Duration = Duration::from_millis(800);

/// Hard cap on one utterance, beyond the listen timeout.
const MAX_UTTERANCE: Duration = Duration::from_secs(20);

/// Poll interval for the capture supervision loop.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Microphone capture over the default input device.
pub struct MicrophoneCapture {
    rms_threshold: f32,
}

impl Default for MicrophoneCapture {
    fn default() -> Self {
        Self { rms_threshold: SPEECH_RMS_THRESHOLD }
    }
}

impl MicrophoneCapture {
    /// Create a capture with the default speech threshold.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe for an input device so setup failures are fatal up front,
    /// not on the first capture cycle.
    pub fn probe() -> Result<(), GatewayError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(GatewayError::NoInputDevice)?;
        let config = device
            .default_input_config()
            .map_err(|e| GatewayError::InputStream(e.to_string()))?;
        tracing::info!(
            device = %device.name().unwrap_or_default(),
            sample_rate = config.sample_rate().0,
            channels = config.channels(),
            "Audio input device ready"
        );
        Ok(())
    }
}

/// Shared state between the cpal callback and the supervision loop.
struct CaptureShared {
    buffer: Mutex<Vec<f32>>,
    speech_started: AtomicBool,
    last_voice: Mutex<Instant>,
}

#[async_trait]
impl CapturePort for MicrophoneCapture {
    async fn listen(&self, timeout: Duration) -> Result<Option<AudioClip>, GatewayError> {
        let threshold = self.rms_threshold;
        tokio::task::spawn_blocking(move || listen_blocking(timeout, threshold))
            .await
            .map_err(|e| GatewayError::InputStream(e.to_string()))?
    }
}

fn listen_blocking(timeout: Duration, threshold: f32) -> Result<Option<AudioClip>, GatewayError> {
    let host = cpal::default_host();
    let device = host.default_input_device().ok_or(GatewayError::NoInputDevice)?;
    let config = device
        .default_input_config()
        .map_err(|e| GatewayError::InputStream(e.to_string()))?;

    let sample_rate = config.sample_rate().0;
    let channels = config.channels();

    let shared = Arc::new(CaptureShared {
        buffer: Mutex::new(Vec::new()),
        speech_started: AtomicBool::new(false),
        last_voice: Mutex::new(Instant::now()),
    });

    let stream = build_input_stream(&device, &config, Arc::clone(&shared), threshold)?;
    stream
        .play()
        .map_err(|e| GatewayError::InputStream(e.to_string()))?;

    let start = Instant::now();
    loop {
        std::thread::sleep(POLL_INTERVAL);

        let started = shared.speech_started.load(Ordering::Relaxed);
        if !started {
            if start.elapsed() >= timeout {
                drop(stream);
                tracing::debug!("Listen window elapsed with no speech");
                return Ok(None);
            }
            continue;
        }

        let quiet_for = shared
            .last_voice
            .lock()
            .map(|t| t.elapsed())
            .unwrap_or_default();
        if quiet_for >= SILENCE_HOLD || start.elapsed() >= timeout + MAX_UTTERANCE {
            break;
        }
    }

    drop(stream);

    let raw = {
        let mut buf = shared
            .buffer
            .lock()
            .map_err(|e| GatewayError::InputStream(e.to_string()))?;
        std::mem::take(&mut *buf)
    };

    let mono = if channels > 1 { downmix_to_mono(&raw, channels) } else { raw };
    tracing::debug!(samples = mono.len(), sample_rate, "Utterance captured");
    Ok(Some(AudioClip { samples: mono, sample_rate }))
}

/// Build a cpal input stream that writes samples into the shared buffer
/// and tracks speech activity.
fn build_input_stream(
    device: &Device,
    config: &cpal::SupportedStreamConfig,
    shared: Arc<CaptureShared>,
    threshold: f32,
) -> Result<Stream, GatewayError> {
    let stream_config: StreamConfig = config.clone().into();
    let sample_format = config.sample_format();

    let err_fn = |err: cpal::StreamError| {
        tracing::error!(%err, "Audio input stream error");
    };

    let on_chunk = move |chunk: Vec<f32>| {
        if rms(&chunk) > threshold {
            shared.speech_started.store(true, Ordering::Relaxed);
            if let Ok(mut t) = shared.last_voice.lock() {
                *t = Instant::now();
            }
        }
        if let Ok(mut buf) = shared.buffer.lock() {
            buf.extend_from_slice(&chunk);
        }
    };

    let stream = match sample_format {
        SampleFormat::F32 => device.build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                on_chunk(data.to_vec());
            },
            err_fn,
            None,
        ),
        SampleFormat::I16 => device.build_input_stream(
            &stream_config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let floats: Vec<f32> = data.iter().map(|&s| f32::from(s) / 32768.0).collect();
                on_chunk(floats);
            },
            err_fn,
            None,
        ),
        SampleFormat::U16 => device.build_input_stream(
            &stream_config,
            move |data: &[u16], _: &cpal::InputCallbackInfo| {
                let floats: Vec<f32> = data
                    .iter()
                    .map(|&s| (f32::from(s) - 32768.0) / 32768.0)
                    .collect();
                on_chunk(floats);
            },
            err_fn,
            None,
        ),
        other => {
            return Err(GatewayError::InputStream(format!(
                "unsupported sample format: {other:?}"
            )));
        }
    };

    stream.map_err(|e| GatewayError::InputStream(e.to_string()))
}

/// Root-mean-square level of a chunk.
fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

/// Average interleaved channels down to mono.
fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    let channels = usize::from(channels);
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_of_silence_is_zero() {
        assert_eq!(rms(&[0.0; 64]), 0.0);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn rms_of_full_scale_square_wave_is_one() {
        let wave: Vec<f32> = (0..64).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert!((rms(&wave) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn downmix_averages_frames() {
        let interleaved = [0.2, 0.4, -1.0, 1.0];
        assert_eq!(downmix_to_mono(&interleaved, 2), vec![0.3, 0.0]);
    }
}
