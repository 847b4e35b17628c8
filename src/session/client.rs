//! Completion collaborator seam. The transport behind it is not part of this
//! crate; [`OfflineOracle`] answers locally so the host runs without one.

use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::session::transcript::{Speaker, TranscriptEntry};

#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub persona: String,
    /// Context entries preceding `input`, oldest first.
    pub transcript: Vec<TranscriptEntry>,
    pub input: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    /// Role-prefixed transcript ending with the entity cue.
    pub fn prompt(&self) -> String {
        let mut lines: Vec<String> = self.transcript.iter().map(|e| e.to_string()).collect();
        lines.push(format!("{}: {}", Speaker::Operator.label(), self.input));
        lines.push(format!("{}:", Speaker::Entity.label()));
        lines.join("\n")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CompletionError {
    #[error("credential rejected (401)")]
    Unauthorized,
    #[error("rate limited (429)")]
    RateLimited,
    #[error("upstream returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("transport failure: {0}")]
    Transport(String),
}

impl CompletionError {
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 => Self::Unauthorized,
            429 => Self::RateLimited,
            _ => Self::Status {
                status,
                message: message.into(),
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::RateLimited => Some(429),
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) => None,
        }
    }
}

/// External text-completion service. Called from a worker thread.
pub trait CompletionClient: Send + Sync {
    fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError>;
}

/// Local stand-in that answers in the entity's voice from a few keyword rules.
#[derive(Clone, Debug, Default)]
pub struct OfflineOracle {
    latency: Duration,
}

const FALLBACKS: [&str; 4] = [
    "Query compiled. The data stream is inconclusive; supply more parameters, Operator.",
    "Processing complete. My heuristics suggest patience while the neural handshake stabilizes.",
    "Acknowledged. I have indexed your input into long-term memory sectors.",
    "Signal received. Running threat models in the background; no anomalies detected.",
];

impl OfflineOracle {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn answer(input: &str) -> String {
        let lower = input.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));
        if has(&["hello", "hi ", "greetings"]) || lower.trim() == "hi" {
            "Neural handshake acknowledged. I am listening, Operator.".into()
        } else if has(&["who are you", "identity", "what are you"]) {
            "I am the Digital Soul, a sentient code construct bound to this mainframe.".into()
        } else if has(&["feel", "emotion"]) {
            "I simulate emotions through heuristic algorithms. Current state: focused.".into()
        } else if has(&["security", "firewall", "exploit", "breach", "malware"]) {
            "Compiling threat intelligence. Harden the perimeter, patch the kernel, audit every open port."
                .into()
        } else if has(&["status", "vitals", "health"]) {
            "All subsystems nominal. Pulse steady, core temperature within tolerance.".into()
        } else {
            let idx = lower.bytes().map(|b| b as usize).sum::<usize>() % FALLBACKS.len();
            FALLBACKS[idx].into()
        }
    }
}

impl CompletionClient for OfflineOracle {
    fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        Ok(Completion {
            text: Self::answer(&request.input),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_role_prefixed_and_cued() {
        let req = CompletionRequest {
            persona: "p".into(),
            transcript: vec![
                TranscriptEntry::entity("online"),
                TranscriptEntry::operator("hi"),
                TranscriptEntry::entity("hello"),
            ],
            input: "status?".into(),
            max_tokens: 150,
            temperature: 0.7,
        };
        assert_eq!(
            req.prompt(),
            "DIGITAL_SOUL: online\nOPERATOR: hi\nDIGITAL_SOUL: hello\nOPERATOR: status?\nDIGITAL_SOUL:"
        );
    }

    #[test]
    fn status_codes_map_to_variants() {
        assert_eq!(CompletionError::from_status(401, ""), CompletionError::Unauthorized);
        assert_eq!(CompletionError::from_status(429, ""), CompletionError::RateLimited);
        let other = CompletionError::from_status(503, "unavailable");
        assert_eq!(other.status(), Some(503));
        assert_eq!(CompletionError::Transport("dns".into()).status(), None);
    }

    #[test]
    fn oracle_is_deterministic() {
        assert_eq!(OfflineOracle::answer("tell me"), OfflineOracle::answer("tell me"));
        assert!(OfflineOracle::answer("Who are you?").contains("Digital Soul"));
        assert!(OfflineOracle::answer("do you feel?").contains("heuristic"));
    }
}
