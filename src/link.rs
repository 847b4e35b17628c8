//! Wires operator input to the session, replies to narration, and narration
//! to the speaking flag read by the avatar.

use std::time::Duration;

use tracing::{debug, info};

use crate::audio::{Narrator, PlayOutcome, SpeakingFlag, ToneEvent, ToneFeedback};
use crate::session::{Reply, Session, SubmitOutcome, Transcript};

pub struct Link {
    session: Session,
    tones: ToneFeedback,
    narrator: Narrator,
    muted: bool,
    shut_down: bool,
}

impl Link {
    pub fn new(session: Session, tones: ToneFeedback, narrator: Narrator) -> Self {
        Self {
            session,
            tones,
            narrator,
            muted: false,
            shut_down: false,
        }
    }

    pub fn speaking_flag(&self) -> SpeakingFlag {
        self.narrator.flag()
    }

    pub fn narrator_mut(&mut self) -> &mut Narrator {
        &mut self.narrator
    }

    pub fn transcript(&self) -> &Transcript {
        self.session.transcript()
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Muting silences tones and cuts off any narration in progress.
    pub fn set_muted(&mut self, muted: bool) {
        if self.muted != muted {
            info!(muted, "audio mute toggled");
        }
        self.muted = muted;
        self.tones.set_muted(muted);
        self.narrator.set_muted(muted);
    }

    /// Bring up the tone sink from a user gesture.
    pub fn prime_audio(&mut self) {
        if !self.muted && !self.tones.is_initialized() {
            self.tones.prime();
        }
    }

    pub fn submit(&mut self, input: &str) -> SubmitOutcome {
        if self.shut_down {
            return SubmitOutcome::Closed;
        }
        let outcome = self.session.submit(input);
        if outcome.accepted() {
            self.play(ToneEvent::Keystroke);
            self.play(ToneEvent::ProcessStart);
        }
        if let SubmitOutcome::Resolved(reply) = &outcome {
            self.deliver(reply);
        }
        outcome
    }

    /// Pump speech signals and apply a finished reply. Call once per frame.
    pub fn update(&mut self) -> Option<Reply> {
        self.narrator.poll();
        let reply = self.session.poll()?;
        self.deliver(&reply);
        Some(reply)
    }

    /// Headless variant of [`update`](Self::update) that blocks for the reply.
    pub fn wait_reply(&mut self, timeout: Duration) -> Option<Reply> {
        let reply = self.session.wait(timeout)?;
        self.deliver(&reply);
        self.narrator.poll();
        Some(reply)
    }

    fn play(&mut self, event: ToneEvent) {
        if let PlayOutcome::Unavailable = self.tones.play(event) {
            debug!(?event, "tone skipped");
        }
    }

    fn deliver(&mut self, reply: &Reply) {
        if reply.kind.is_failure() {
            self.play(ToneEvent::Error);
        }
        self.narrator.narrate(&reply.narration);
    }

    /// Cancel narration and dispose the session. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.narrator.cancel();
        self.session.dispose();
        debug!("link shut down");
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        self.shutdown();
    }
}
