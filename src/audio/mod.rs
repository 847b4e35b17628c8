//! Audio feedback: event tones and narration.

pub mod feedback;
pub mod output;
pub mod speech;
pub mod tone;
pub mod writer;

use thiserror::Error;

pub use feedback::{PlayOutcome, SinkFactory, SinkState, ToneFeedback, ToneSink};
pub use speech::{
    Narrator, PacedSpeech, SpeakingFlag, SpeakingTransition, SpeechEngine, SpeechEvent,
    Utterance, UtteranceId, VoiceInfo, VoiceParams,
};
pub use tone::{ToneEvent, ToneSpec, Waveshape};

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no output device available")]
    NoDevice,
    #[error("output config: {0}")]
    Config(String),
    #[error("output stream: {0}")]
    Stream(String),
    #[error("wav capture: {0}")]
    Wav(#[from] hound::Error),
    #[error("speech engine: {0}")]
    Speech(String),
    #[error("audio sink closed")]
    Closed,
}
