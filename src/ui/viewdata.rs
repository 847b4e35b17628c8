use crate::session::Transcript;
use crate::telemetry::TelemetryFrame;

/// Everything the window reads in one frame.
#[derive(Clone, Copy)]
pub struct UiView<'a> {
    pub telemetry: Option<&'a TelemetryFrame>,
    pub transcript: &'a Transcript,
    pub busy: bool,
    pub muted: bool,
    pub speaking: bool,
    pub glyph_size: f32,
}

/// Operator intents collected while laying out the window.
#[derive(Clone, Debug, PartialEq)]
pub enum UiAction {
    Submit(String),
    SetMuted(bool),
    /// Input focus counts as the user gesture that may start audio.
    PrimeAudio,
}

#[derive(Debug, Default)]
pub struct ChatInput {
    pub text: String,
}
