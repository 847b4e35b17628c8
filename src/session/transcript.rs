use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speaker {
    Operator,
    Entity,
}

impl Speaker {
    pub fn label(self) -> &'static str {
        match self {
            Speaker::Operator => "OPERATOR",
            Speaker::Entity => "DIGITAL_SOUL",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl TranscriptEntry {
    pub fn operator(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Operator,
            text: text.into(),
        }
    }

    pub fn entity(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Entity,
            text: text.into(),
        }
    }
}

impl fmt::Display for TranscriptEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.speaker.label(), self.text)
    }
}

/// Append-only conversation log.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    /// The most recent `k` entries, oldest first.
    pub fn window(&self, k: usize) -> &[TranscriptEntry] {
        let start = self.entries.len().saturating_sub(k);
        &self.entries[start..]
    }
}
