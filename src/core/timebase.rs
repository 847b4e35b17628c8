use std::time::{Duration, Instant};

pub type Tick = u64;

/// Fixed-interval tick clock for the background simulators.
#[derive(Clone, Copy, Debug)]
pub struct Timebase {
    pub interval: Duration,
}

impl Timebase {
    /// Longest interval that still reads as smooth motion on the telemetry panel.
    pub const MAX_INTERVAL: Duration = Duration::from_millis(200);

    pub fn from_millis(ms: u64) -> Self {
        let ms = ms.clamp(1, Self::MAX_INTERVAL.as_millis() as u64);
        Self {
            interval: Duration::from_millis(ms),
        }
    }

    pub fn tick_to_sec(&self, t: Tick) -> f32 {
        t as f32 * self.interval.as_secs_f32()
    }
}

/// Deadline-based pacing: sleeps until the next tick, and resets the deadline
/// instead of bursting when the caller overruns.
pub struct Pacer {
    interval: Duration,
    next_deadline: Instant,
}

impl Pacer {
    pub fn new(time: Timebase) -> Self {
        Self {
            interval: time.interval,
            next_deadline: Instant::now(),
        }
    }

    /// Advance the deadline and return how long the caller should sleep.
    pub fn next_wait(&mut self, now: Instant) -> Option<Duration> {
        self.next_deadline += self.interval;
        if now < self.next_deadline {
            Some(self.next_deadline - now)
        } else {
            self.next_deadline = now;
            None
        }
    }
}
