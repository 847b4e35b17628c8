//! Narration through a text-to-speech collaborator, and the speaking flag it drives.
//!
//! The [`Narrator`] is the only writer of the speaking flag. Engines report
//! lifecycle signals as [`SpeechEvent`]s tagged with the utterance id; signals
//! from superseded utterances are ignored, so the flag rises and falls exactly
//! once per narration.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{debug, warn};

use crate::audio::AudioError;

pub type UtteranceId = u64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoiceInfo {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub pitch: f32,
    pub rate: f32,
    pub volume: f32,
    /// Catalog voice to use; `None` means the engine default.
    pub voice: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeechEvent {
    Started(UtteranceId),
    Ended(UtteranceId),
}

/// Text-to-speech collaborator.
pub trait SpeechEngine {
    fn voices(&self) -> Vec<VoiceInfo>;
    /// Begin speaking. Start/end signals go to the engine's event channel.
    fn speak(&mut self, id: UtteranceId, utterance: Utterance) -> Result<(), AudioError>;
    /// Stop whatever is being spoken.
    fn cancel(&mut self);
}

/// Channel pair connecting an engine to a [`Narrator`].
pub fn speech_channel() -> (Sender<SpeechEvent>, Receiver<SpeechEvent>) {
    unbounded()
}

/// Read side of the speaking state.
#[derive(Clone, Debug, Default)]
pub struct SpeakingFlag(Arc<AtomicBool>);

impl SpeakingFlag {
    pub fn is_speaking(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn set(&self, value: bool) {
        self.0.store(value, Ordering::Release);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeakingTransition {
    Started(UtteranceId),
    Ended(UtteranceId),
}

#[derive(Clone, Debug)]
pub struct VoiceParams {
    pub pitch: f32,
    pub rate: f32,
    pub volume: f32,
    /// Lower-case substrings matched against catalog voice names.
    pub preferred_voices: Vec<String>,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            pitch: 0.6,
            rate: 1.0,
            volume: 0.8,
            preferred_voices: vec![
                "google us english".into(),
                "samantha".into(),
                "david".into(),
            ],
        }
    }
}

/// Remove markup punctuation that engines would otherwise read aloud.
pub fn strip_markup(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '*' | '#' | '_' | '`'))
        .collect()
}

/// First catalog voice whose name contains any preferred substring.
pub fn choose_voice(voices: &[VoiceInfo], preferred: &[String]) -> Option<String> {
    voices
        .iter()
        .find(|v| {
            let name = v.name.to_lowercase();
            preferred
                .iter()
                .any(|p| !p.is_empty() && name.contains(&p.to_lowercase()))
        })
        .map(|v| v.name.clone())
}

pub struct Narrator {
    engine: Box<dyn SpeechEngine>,
    events: Receiver<SpeechEvent>,
    params: VoiceParams,
    flag: SpeakingFlag,
    subscribers: Vec<Sender<SpeakingTransition>>,
    next_id: UtteranceId,
    current: Option<UtteranceId>,
    speaking: bool,
    muted: bool,
}

impl Narrator {
    pub fn new(
        engine: Box<dyn SpeechEngine>,
        events: Receiver<SpeechEvent>,
        params: VoiceParams,
    ) -> Self {
        Self {
            engine,
            events,
            params,
            flag: SpeakingFlag::default(),
            subscribers: Vec::new(),
            next_id: 1,
            current: None,
            speaking: false,
            muted: false,
        }
    }

    pub fn flag(&self) -> SpeakingFlag {
        self.flag.clone()
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Id of the narration that has not ended yet.
    pub fn current(&self) -> Option<UtteranceId> {
        self.current
    }

    /// Push-style view of the flag transitions.
    pub fn subscribe(&mut self) -> Receiver<SpeakingTransition> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.cancel();
        }
    }

    fn publish(&mut self, transition: SpeakingTransition) {
        self.speaking = matches!(transition, SpeakingTransition::Started(_));
        self.flag.set(self.speaking);
        self.subscribers.retain(|tx| tx.send(transition).is_ok());
    }

    /// Speak `text`, cancelling anything in flight. Returns the utterance id,
    /// or `None` when muted, empty after cleanup, or rejected by the engine.
    pub fn narrate(&mut self, text: &str) -> Option<UtteranceId> {
        if self.muted {
            return None;
        }
        let clean = strip_markup(text);
        if clean.trim().is_empty() {
            return None;
        }
        self.cancel();

        let id = self.next_id;
        self.next_id += 1;
        let voice = choose_voice(&self.engine.voices(), &self.params.preferred_voices);
        let utterance = Utterance {
            text: clean,
            pitch: self.params.pitch,
            rate: self.params.rate,
            volume: self.params.volume,
            voice,
        };
        if let Err(err) = self.engine.speak(id, utterance) {
            warn!(id, "narration rejected: {err}");
            return None;
        }
        debug!(id, "narration queued");
        self.current = Some(id);
        Some(id)
    }

    /// Stop the current narration. Lowers the flag if it was raised.
    pub fn cancel(&mut self) -> Option<SpeakingTransition> {
        let id = self.current.take()?;
        self.engine.cancel();
        if self.speaking {
            let t = SpeakingTransition::Ended(id);
            self.publish(t);
            return Some(t);
        }
        None
    }

    /// Apply pending engine signals.
    pub fn poll(&mut self) -> Vec<SpeakingTransition> {
        let mut out = Vec::new();
        let pending: Vec<SpeechEvent> = self.events.try_iter().collect();
        for ev in pending {
            match ev {
                SpeechEvent::Started(id) if self.current == Some(id) && !self.speaking => {
                    let t = SpeakingTransition::Started(id);
                    self.publish(t);
                    out.push(t);
                }
                SpeechEvent::Ended(id) if self.current == Some(id) => {
                    self.current = None;
                    if self.speaking {
                        let t = SpeakingTransition::Ended(id);
                        self.publish(t);
                        out.push(t);
                    }
                }
                stale => debug!(?stale, "ignoring speech event"),
            }
        }
        out
    }
}

impl Drop for Narrator {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Built-in engine without a voice: signals start at once and end after a
/// duration estimated from word count and rate.
pub struct PacedSpeech {
    events: Sender<SpeechEvent>,
    words_per_sec: f32,
    active: Option<Arc<AtomicBool>>,
}

impl PacedSpeech {
    pub const DEFAULT_WORDS_PER_SEC: f32 = 2.5;
    const MIN_DURATION: Duration = Duration::from_millis(400);
    const POLL: Duration = Duration::from_millis(10);

    pub fn new(events: Sender<SpeechEvent>) -> Self {
        Self {
            events,
            words_per_sec: Self::DEFAULT_WORDS_PER_SEC,
            active: None,
        }
    }

    pub fn with_words_per_sec(mut self, wps: f32) -> Self {
        self.words_per_sec = wps.max(0.1);
        self
    }

    pub fn estimate(&self, utterance: &Utterance) -> Duration {
        let words = utterance.text.split_whitespace().count() as f32;
        let rate = utterance.rate.max(0.1);
        Duration::from_secs_f32(words / (self.words_per_sec * rate)).max(Self::MIN_DURATION)
    }
}

impl SpeechEngine for PacedSpeech {
    fn voices(&self) -> Vec<VoiceInfo> {
        vec![VoiceInfo {
            name: "Paced Default".into(),
        }]
    }

    fn speak(&mut self, id: UtteranceId, utterance: Utterance) -> Result<(), AudioError> {
        self.cancel();
        let duration = self.estimate(&utterance);
        let cancelled = Arc::new(AtomicBool::new(false));
        self.active = Some(cancelled.clone());
        let tx = self.events.clone();
        thread::Builder::new()
            .name("paced-speech".into())
            .spawn(move || {
                let _ = tx.send(SpeechEvent::Started(id));
                let end = Instant::now() + duration;
                while Instant::now() < end && !cancelled.load(Ordering::SeqCst) {
                    thread::sleep(Self::POLL);
                }
                // like host engines, a cancelled utterance still reports its end
                let _ = tx.send(SpeechEvent::Ended(id));
            })
            .map_err(|e| AudioError::Speech(e.to_string()))?;
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(flag) = self.active.take() {
            flag.store(true, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Engine that records calls and lets the test emit signals by hand.
    struct ManualEngine {
        voices: Vec<VoiceInfo>,
        spoken: Rc<RefCell<Vec<(UtteranceId, Utterance)>>>,
        cancels: Rc<RefCell<u32>>,
    }

    impl SpeechEngine for ManualEngine {
        fn voices(&self) -> Vec<VoiceInfo> {
            self.voices.clone()
        }
        fn speak(&mut self, id: UtteranceId, utterance: Utterance) -> Result<(), AudioError> {
            self.spoken.borrow_mut().push((id, utterance));
            Ok(())
        }
        fn cancel(&mut self) {
            *self.cancels.borrow_mut() += 1;
        }
    }

    struct Rig {
        narrator: Narrator,
        tx: Sender<SpeechEvent>,
        spoken: Rc<RefCell<Vec<(UtteranceId, Utterance)>>>,
        cancels: Rc<RefCell<u32>>,
    }

    fn rig(voices: &[&str]) -> Rig {
        let (tx, rx) = speech_channel();
        let spoken = Rc::new(RefCell::new(Vec::new()));
        let cancels = Rc::new(RefCell::new(0));
        let engine = ManualEngine {
            voices: voices
                .iter()
                .map(|n| VoiceInfo {
                    name: n.to_string(),
                })
                .collect(),
            spoken: spoken.clone(),
            cancels: cancels.clone(),
        };
        Rig {
            narrator: Narrator::new(Box::new(engine), rx, VoiceParams::default()),
            tx,
            spoken,
            cancels,
        }
    }

    #[test]
    fn strip_markup_removes_only_markup() {
        assert_eq!(strip_markup("**bold** `code` #tag _x_"), "bold code tag x");
        assert_eq!(strip_markup("plain, text."), "plain, text.");
    }

    #[test]
    fn preferred_voice_is_case_insensitive_substring() {
        let voices = vec![
            VoiceInfo {
                name: "Alex".into(),
            },
            VoiceInfo {
                name: "Microsoft David Desktop".into(),
            },
            VoiceInfo {
                name: "Samantha".into(),
            },
        ];
        let prefs = VoiceParams::default().preferred_voices;
        assert_eq!(
            choose_voice(&voices, &prefs).as_deref(),
            Some("Microsoft David Desktop")
        );
        assert_eq!(choose_voice(&voices[..1], &prefs), None);
    }

    #[test]
    fn utterance_carries_voice_settings() {
        let mut r = rig(&["Samantha"]);
        let id = r.narrator.narrate("*Hello* operator").unwrap();
        let spoken = r.spoken.borrow();
        let (sid, u) = &spoken[0];
        assert_eq!(*sid, id);
        assert_eq!(u.text, "Hello operator");
        assert_eq!(u.pitch, 0.6);
        assert_eq!(u.rate, 1.0);
        assert_eq!(u.voice.as_deref(), Some("Samantha"));
    }

    #[test]
    fn flag_rises_and_falls_once() {
        let mut r = rig(&[]);
        let flag = r.narrator.flag();
        assert!(!flag.is_speaking());
        let id = r.narrator.narrate("hello").unwrap();
        assert!(!flag.is_speaking(), "flag waits for the start signal");

        r.tx.send(SpeechEvent::Started(id)).unwrap();
        r.tx.send(SpeechEvent::Started(id)).unwrap();
        assert_eq!(r.narrator.poll(), vec![SpeakingTransition::Started(id)]);
        assert!(flag.is_speaking());

        r.tx.send(SpeechEvent::Ended(id)).unwrap();
        r.tx.send(SpeechEvent::Ended(id)).unwrap();
        assert_eq!(r.narrator.poll(), vec![SpeakingTransition::Ended(id)]);
        assert!(!flag.is_speaking());
        assert_eq!(r.narrator.current(), None);
    }

    #[test]
    fn new_narration_supersedes_and_ignores_stale_signals() {
        let mut r = rig(&[]);
        let flag = r.narrator.flag();
        let events = r.narrator.subscribe();
        let first = r.narrator.narrate("first").unwrap();
        r.tx.send(SpeechEvent::Started(first)).unwrap();
        r.narrator.poll();

        let second = r.narrator.narrate("second").unwrap();
        assert!(!flag.is_speaking(), "superseded narration lowers the flag");
        assert_eq!(*r.cancels.borrow(), 1);

        r.tx.send(SpeechEvent::Ended(first)).unwrap();
        r.tx.send(SpeechEvent::Started(second)).unwrap();
        assert_eq!(r.narrator.poll(), vec![SpeakingTransition::Started(second)]);

        let seen: Vec<_> = events.try_iter().collect();
        assert_eq!(
            seen,
            vec![
                SpeakingTransition::Started(first),
                SpeakingTransition::Ended(first),
                SpeakingTransition::Started(second),
            ]
        );
    }

    #[test]
    fn cancel_before_start_never_raises_flag() {
        let mut r = rig(&[]);
        let flag = r.narrator.flag();
        let id = r.narrator.narrate("quick").unwrap();
        assert_eq!(r.narrator.cancel(), None);
        r.tx.send(SpeechEvent::Started(id)).unwrap();
        r.tx.send(SpeechEvent::Ended(id)).unwrap();
        assert!(r.narrator.poll().is_empty());
        assert!(!flag.is_speaking());
    }

    #[test]
    fn muted_or_empty_text_is_not_spoken() {
        let mut r = rig(&[]);
        assert_eq!(r.narrator.narrate("**__**"), None);
        r.narrator.set_muted(true);
        assert_eq!(r.narrator.narrate("hello"), None);
        assert!(r.spoken.borrow().is_empty());
    }

    #[test]
    fn paced_engine_estimates_from_words_and_rate() {
        let (tx, _rx) = speech_channel();
        let engine = PacedSpeech::new(tx);
        let u = Utterance {
            text: "one two three four five".into(),
            pitch: 0.6,
            rate: 1.0,
            volume: 0.8,
            voice: None,
        };
        assert_eq!(engine.estimate(&u), Duration::from_secs(2));
        let fast = Utterance { rate: 2.0, ..u };
        assert_eq!(engine.estimate(&fast), Duration::from_secs(1));
    }

    #[test]
    fn paced_engine_signals_start_then_end() {
        let (tx, rx) = speech_channel();
        let mut engine = PacedSpeech::new(tx).with_words_per_sec(100.0);
        let u = Utterance {
            text: "hi".into(),
            pitch: 0.6,
            rate: 1.0,
            volume: 0.8,
            voice: None,
        };
        engine.speak(7, u).unwrap();
        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first, SpeechEvent::Started(7));
        assert_eq!(second, SpeechEvent::Ended(7));
    }
}
