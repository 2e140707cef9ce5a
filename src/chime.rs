//! Audible alert tone, synthesized and played via cpal.
//!
//! The chime is strictly best-effort: the dispatcher runs it on a detached
//! thread and swallows every failure, so a missing output device or a
//! stream error can never abort an evaluation pass.

use crate::config::{ToneConfig, Waveform};
use crate::error::{Result, RoutineError};
use cpal::StreamConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Something that can play the alert tone.
pub trait Chime: Send + Sync {
    /// Play the tone to completion.
    ///
    /// # Errors
    ///
    /// Returns an error when no sound could be produced. Callers treat
    /// this as a normal condition and discard it.
    fn play(&self, tone: &ToneConfig) -> Result<()>;
}

/// Synthesize the tone as mono f32 samples.
pub fn synthesize(tone: &ToneConfig) -> Vec<f32> {
    let sample_count = (u64::from(tone.sample_rate) * tone.duration_ms / 1000) as usize;
    let mut samples = Vec::with_capacity(sample_count);

    for i in 0..sample_count {
        let t = i as f32 / tone.sample_rate as f32;
        let cycle = (t * tone.frequency_hz).fract();
        let value = match tone.waveform {
            Waveform::Sine => (2.0 * std::f32::consts::PI * cycle).sin(),
            Waveform::Square => {
                if cycle < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => 4.0 * (cycle - 0.5).abs() - 1.0,
        };
        samples.push(value * tone.gain);
    }

    samples
}

/// Plays the tone through the system output device.
///
/// The device and stream are set up fresh on every play; a chime fires at
/// most once a minute, so there is nothing worth keeping open between
/// alerts and a device that appears later is picked up automatically.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpalChime;

impl Chime for CpalChime {
    fn play(&self, tone: &ToneConfig) -> Result<()> {
        let host = cpal::default_host();

        let device = if let Some(ref name) = tone.output_device {
            host.output_devices()
                .map_err(|e| RoutineError::Audio(format!("cannot enumerate devices: {e}")))?
                .find(|d| {
                    d.description()
                        .ok()
                        .map(|desc| desc.name() == name)
                        .unwrap_or(false)
                })
                .ok_or_else(|| RoutineError::Audio(format!("output device '{name}' not found")))?
        } else {
            host.default_output_device()
                .ok_or_else(|| RoutineError::Audio("no default output device".into()))?
        };

        let stream_config = StreamConfig {
            channels: 1,
            sample_rate: tone.sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let buffer = Arc::new(Mutex::new(PlaybackBuffer {
            samples: synthesize(tone),
            position: 0,
            finished: false,
        }));
        let buffer_clone = Arc::clone(&buffer);

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                    let mut buf = match buffer_clone.lock() {
                        Ok(b) => b,
                        Err(_) => return,
                    };

                    for sample in data.iter_mut() {
                        if buf.position < buf.samples.len() {
                            *sample = buf.samples[buf.position];
                            buf.position += 1;
                        } else {
                            *sample = 0.0;
                            buf.finished = true;
                        }
                    }
                },
                move |err| {
                    tracing::debug!("chime output stream error: {err}");
                },
                None,
            )
            .map_err(|e| RoutineError::Audio(format!("failed to build output stream: {e}")))?;

        stream
            .play()
            .map_err(|e| RoutineError::Audio(format!("failed to start output stream: {e}")))?;

        // Wait for playback, bounded so a stalled stream cannot hang the
        // dispatch thread past the tone duration.
        let deadline = Instant::now() + Duration::from_millis(tone.duration_ms + 500);
        loop {
            std::thread::sleep(Duration::from_millis(10));
            let finished = buffer
                .lock()
                .map(|buf| buf.finished)
                .map_err(|e| RoutineError::Audio(format!("playback buffer lock poisoned: {e}")))?;
            if finished || Instant::now() >= deadline {
                break;
            }
        }

        drop(stream);
        Ok(())
    }
}

/// No-op chime for headless environments and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentChime;

impl Chime for SilentChime {
    fn play(&self, _tone: &ToneConfig) -> Result<()> {
        Ok(())
    }
}

/// Internal buffer for tracking playback progress.
struct PlaybackBuffer {
    samples: Vec<f32>,
    position: usize,
    finished: bool,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn tone(waveform: Waveform) -> ToneConfig {
        ToneConfig {
            waveform,
            ..ToneConfig::default()
        }
    }

    #[test]
    fn synthesize_produces_duration_worth_of_samples() {
        let samples = synthesize(&tone(Waveform::Sine));
        // 1000ms at 24kHz.
        assert_eq!(samples.len(), 24_000);
    }

    #[test]
    fn sine_stays_within_gain_envelope() {
        let t = tone(Waveform::Sine);
        let samples = synthesize(&t);
        assert!(samples.iter().all(|s| s.abs() <= t.gain + f32::EPSILON));
        assert!(samples.iter().any(|s| s.abs() > t.gain * 0.9));
    }

    #[test]
    fn square_alternates_between_gain_levels() {
        let t = tone(Waveform::Square);
        let samples = synthesize(&t);
        assert!(
            samples
                .iter()
                .all(|s| (s.abs() - t.gain).abs() < f32::EPSILON)
        );
        assert!(samples.iter().any(|s| *s > 0.0));
        assert!(samples.iter().any(|s| *s < 0.0));
    }

    #[test]
    fn triangle_stays_within_gain_envelope() {
        let t = tone(Waveform::Triangle);
        let samples = synthesize(&t);
        assert!(samples.iter().all(|s| s.abs() <= t.gain + f32::EPSILON));
    }

    #[test]
    fn zero_duration_synthesizes_nothing() {
        let t = ToneConfig {
            duration_ms: 0,
            ..ToneConfig::default()
        };
        assert!(synthesize(&t).is_empty());
    }

    #[test]
    fn silent_chime_always_succeeds() {
        assert!(SilentChime.play(&ToneConfig::default()).is_ok());
    }
}
