use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, bounded};
use rand::rngs::StdRng;
use tracing::{debug, trace};

use crate::core::timebase::{Pacer, Tick, Timebase};
use crate::telemetry::vitals::{VitalsSimulator, VitalsState};
use crate::telemetry::waveform::WaveformGenerator;

/// Snapshot published once per telemetry tick.
#[derive(Clone, Debug)]
pub struct TelemetryFrame {
    pub tick: Tick,
    pub vitals: VitalsState,
    pub samples: Vec<f32>,
    pub path: String,
}

/// Vitals and waveform advanced together on one clock.
pub struct Telemetry {
    vitals: VitalsSimulator,
    waveform: WaveformGenerator,
    rng: StdRng,
}

impl Telemetry {
    pub fn new(rng: StdRng) -> Self {
        Self {
            vitals: VitalsSimulator::default(),
            waveform: WaveformGenerator::new(),
            rng,
        }
    }

    pub fn snapshot(&self) -> TelemetryFrame {
        TelemetryFrame {
            tick: self.waveform.tick(),
            vitals: self.vitals.state(),
            samples: self.waveform.samples(),
            path: self.waveform.path(),
        }
    }

    pub fn step(&mut self) -> TelemetryFrame {
        self.vitals.step(&mut self.rng);
        self.waveform.step(&mut self.rng);
        self.snapshot()
    }
}

/// Background thread ticking [`Telemetry`] at a fixed interval.
pub struct TelemetryWorker {
    frame_rx: Receiver<TelemetryFrame>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TelemetryWorker {
    pub fn spawn(telemetry: Telemetry, time: Timebase) -> std::io::Result<Self> {
        let (frame_tx, frame_rx) = bounded::<TelemetryFrame>(8);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_worker = stop.clone();
        let handle = thread::Builder::new()
            .name("telemetry".into())
            .spawn(move || run(telemetry, time, frame_tx, stop_worker))?;
        Ok(Self {
            frame_rx,
            stop,
            handle: Some(handle),
        })
    }

    /// Drain to the newest frame, if any arrived since the last call.
    pub fn latest(&self) -> Option<TelemetryFrame> {
        self.frame_rx.try_iter().last()
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TelemetryWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(mut telemetry: Telemetry, time: Timebase, tx: Sender<TelemetryFrame>, stop: Arc<AtomicBool>) {
    debug!(interval_ms = time.interval.as_millis() as u64, "telemetry worker started");
    let mut pacer = Pacer::new(time);
    while !stop.load(Ordering::SeqCst) {
        let frame = telemetry.step();
        // Receiver lagging: drop the frame, the next one supersedes it.
        let _ = tx.try_send(frame);
        match pacer.next_wait(Instant::now()) {
            Some(wait) => thread::sleep(wait),
            None => trace!("telemetry overrun"),
        }
    }
    debug!("telemetry worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::time::Duration;

    #[test]
    fn step_advances_both_simulators() {
        let mut t = Telemetry::new(StdRng::seed_from_u64(1));
        let f0 = t.snapshot();
        assert_eq!(f0.tick, 0);
        let f1 = t.step();
        assert_eq!(f1.tick, 1);
        assert_eq!(f1.samples.len(), 50);
        assert!(f1.vitals.in_bounds());
        assert!(f1.path.starts_with('M'));
    }

    #[test]
    fn worker_publishes_and_stops() {
        let telemetry = Telemetry::new(StdRng::seed_from_u64(2));
        let mut worker = TelemetryWorker::spawn(telemetry, Timebase::from_millis(5)).unwrap();
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut got = None;
        while got.is_none() && Instant::now() < deadline {
            got = worker.latest();
            thread::sleep(Duration::from_millis(5));
        }
        let frame = got.expect("telemetry frame");
        assert!(frame.tick >= 1);
        worker.stop();
        // stop is idempotent
        worker.stop();
    }
}
