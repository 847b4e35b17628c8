use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::traits::*;
use ringbuf::{HeapCons, HeapProd, HeapRb};
use tracing::{debug, error, warn};

use crate::audio::AudioError;
use crate::audio::feedback::{SinkState, ToneSink};

/// Fault latch raised by the stream's error callback and cleared by a
/// successful resume.
#[derive(Clone, Debug, Default)]
struct StreamHealth(Arc<AtomicBool>);

impl StreamHealth {
    fn report_error(&self) {
        self.0.store(true, Ordering::Release);
    }

    fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    fn state(&self) -> SinkState {
        if self.0.load(Ordering::Acquire) {
            SinkState::Suspended
        } else {
            SinkState::Running
        }
    }
}

/// Default output device fed from a mono ring buffer.
pub struct AudioOutput {
    stream: Option<cpal::Stream>,
    prod: HeapProd<f32>,
    sample_rate: u32,
    health: StreamHealth,
}

impl AudioOutput {
    /// Open the default device. `buffer_ms` sizes the ring; tone bursts longer
    /// than the free space are truncated rather than blocking the caller.
    pub fn new(buffer_ms: f32) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let supported_config = device
            .default_output_config()
            .map_err(|e| AudioError::Config(e.to_string()))?;
        let sample_rate = supported_config.sample_rate().0;
        let channels = supported_config.channels();

        let config = cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let capacity = ((sample_rate as f32 * buffer_ms.max(10.0) / 1000.0) as usize).max(1);
        let rb = HeapRb::<f32>::new(capacity);
        let (prod, mut cons): (HeapProd<f32>, HeapCons<f32>) = rb.split();
        let health = StreamHealth::default();
        let health_cb = health.clone();

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let channels = channels as usize;
                    for frame in data.chunks_mut(channels) {
                        let s = cons.try_pop().unwrap_or(0.0);
                        // mono: same value on every channel
                        frame.fill(s);
                    }
                },
                move |err| {
                    error!("output stream error: {err}");
                    health_cb.report_error();
                },
                None,
            )
            .map_err(|e| AudioError::Stream(e.to_string()))?;
        stream
            .play()
            .map_err(|e| AudioError::Stream(e.to_string()))?;
        debug!(sample_rate, channels, capacity, "audio output started");

        Ok(Self {
            stream: Some(stream),
            prod,
            sample_rate,
            health,
        })
    }
}

impl ToneSink for AudioOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn state(&self) -> SinkState {
        self.health.state()
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        let stream = self.stream.as_ref().ok_or(AudioError::Closed)?;
        stream
            .play()
            .map_err(|e| AudioError::Stream(e.to_string()))?;
        self.health.clear();
        Ok(())
    }

    fn play(&mut self, samples: &[f32]) -> Result<(), AudioError> {
        if self.stream.is_none() {
            return Err(AudioError::Closed);
        }
        // a faulted stream is not draining; don't queue behind it
        if self.health.state() == SinkState::Suspended {
            return Err(AudioError::Stream("stream faulted; resume first".into()));
        }
        let written = self.prod.push_slice(samples);
        if written < samples.len() {
            warn!(
                dropped = samples.len() - written,
                "output ring full, tone truncated"
            );
        }
        Ok(())
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        if self.stream.is_some() {
            debug!("stopping output stream");
        }
        self.stream.take();
    }
}
