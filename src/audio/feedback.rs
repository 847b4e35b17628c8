//! Event tones routed to a lazily created sink.
//!
//! Output devices are commonly unusable until a user gesture, so the sink is
//! only built on the first unmuted request and then reused. A muted engine
//! never touches the factory.

use tracing::{debug, warn};

use crate::audio::AudioError;
use crate::audio::tone::{ToneEvent, ToneSpec};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkState {
    Running,
    Suspended,
}

/// Destination for rendered tone samples.
pub trait ToneSink {
    fn sample_rate(&self) -> u32;
    fn state(&self) -> SinkState;
    fn resume(&mut self) -> Result<(), AudioError>;
    fn play(&mut self, samples: &[f32]) -> Result<(), AudioError>;
}

pub type SinkFactory = Box<dyn FnMut() -> Result<Box<dyn ToneSink>, AudioError>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayOutcome {
    Muted,
    /// Sink could not be created or resumed; retried on the next call.
    Unavailable,
    Played { samples: usize },
}

pub struct ToneFeedback {
    factory: SinkFactory,
    sink: Option<Box<dyn ToneSink>>,
    muted: bool,
}

impl ToneFeedback {
    pub fn new(factory: SinkFactory) -> Self {
        Self {
            factory,
            sink: None,
            muted: false,
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_initialized(&self) -> bool {
        self.sink.is_some()
    }

    /// Create the sink if needed and make sure it is running.
    pub fn prime(&mut self) -> Option<&mut Box<dyn ToneSink>> {
        if self.sink.is_none() {
            match (self.factory)() {
                Ok(sink) => {
                    debug!(sample_rate = sink.sample_rate(), "tone sink initialized");
                    self.sink = Some(sink);
                }
                Err(err) => {
                    warn!("tone sink unavailable: {err}");
                    return None;
                }
            }
        }
        let sink = self.sink.as_mut()?;
        if sink.state() == SinkState::Suspended {
            if let Err(err) = sink.resume() {
                warn!("tone sink resume failed: {err}");
                return None;
            }
        }
        Some(sink)
    }

    pub fn play(&mut self, event: ToneEvent) -> PlayOutcome {
        if self.muted {
            return PlayOutcome::Muted;
        }
        let Some(sink) = self.prime() else {
            return PlayOutcome::Unavailable;
        };
        let samples = ToneSpec::for_event(event).render(sink.sample_rate());
        match sink.play(&samples) {
            Ok(()) => PlayOutcome::Played {
                samples: samples.len(),
            },
            Err(err) => {
                warn!(?event, "tone playback failed: {err}");
                PlayOutcome::Unavailable
            }
        }
    }
}
