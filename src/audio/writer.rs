use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, unbounded};
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{debug, error};

use crate::audio::AudioError;
use crate::audio::feedback::{SinkState, ToneSink};

/// Tone sink that captures every burst into a 16-bit mono WAV file.
/// Samples are written on a dedicated thread; the file is finalized on drop.
pub struct WavOutput {
    tx: Option<Sender<Arc<[f32]>>>,
    handle: Option<JoinHandle<()>>,
    sample_rate: u32,
}

impl WavOutput {
    pub fn create(path: impl Into<PathBuf>, sample_rate: u32) -> Result<Self, AudioError> {
        let path = path.into();
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(&path, spec)?;
        let (tx, rx) = unbounded::<Arc<[f32]>>();
        let handle = std::thread::Builder::new()
            .name("wav-writer".into())
            .spawn(move || write_loop(writer, rx))
            .map_err(|e| AudioError::Stream(e.to_string()))?;
        debug!(path = %path.display(), sample_rate, "wav capture started");
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
            sample_rate,
        })
    }

    /// Flush and close the file.
    pub fn finish(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn write_loop<W: std::io::Write + std::io::Seek>(mut writer: WavWriter<W>, rx: Receiver<Arc<[f32]>>) {
    while let Ok(samples) = rx.recv() {
        for &s in samples.iter() {
            let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            if let Err(err) = writer.write_sample(v) {
                error!("wav write failed: {err}");
                return;
            }
        }
    }
    if let Err(err) = writer.finalize() {
        error!("wav finalize failed: {err}");
    }
}

impl ToneSink for WavOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn state(&self) -> SinkState {
        SinkState::Running
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn play(&mut self, samples: &[f32]) -> Result<(), AudioError> {
        let tx = self.tx.as_ref().ok_or(AudioError::Closed)?;
        tx.send(Arc::from(samples)).map_err(|_| AudioError::Closed)
    }
}

impl Drop for WavOutput {
    fn drop(&mut self) {
        self.finish();
    }
}
