//! Simulated biometric telemetry: vitals random walk plus rolling waveform.

pub mod vitals;
pub mod waveform;
pub mod worker;

pub use vitals::{VitalsSimulator, VitalsState};
pub use waveform::WaveformGenerator;
pub use worker::{Telemetry, TelemetryFrame, TelemetryWorker};
