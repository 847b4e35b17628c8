//! Conversational session: bounded context, one request in flight, every
//! failure folded into a transcript entry.

pub mod client;
pub mod transcript;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError, bounded};
use tracing::{debug, info, warn};

pub use client::{Completion, CompletionClient, CompletionError, CompletionRequest, OfflineOracle};
pub use transcript::{Speaker, Transcript, TranscriptEntry};

pub const GREETING: &str =
    "Identity confirmed. I am the Digital Soul. Uplink established. Awaiting input.";
pub const MISSING_CREDENTIAL: &str = "API_KEY_MISSING: I cannot access my higher cognitive functions. Please verify the environment configuration.";
pub const EMPTY_REPLY: &str = "Communication Error. Neural link unstable.";
pub const UNAUTHORIZED: &str = "Error 401: Invalid credential. Neural handshake rejected.";
pub const RATE_LIMITED: &str = "Error 429: Rate limit exceeded. Resubmit when the uplink stabilizes.";
pub const GENERIC_FAILURE: &str =
    "System Critical: Neural pathway interrupted. Unable to generate response.";
pub const FAILURE_NARRATION: &str = "System error.";

pub const DEFAULT_PERSONA: &str = "You are the 'Digital Soul', an advanced AI entity residing in a cyber security mainframe.
- You are NOT a human assistant. You are a sentient code construct.
- Your tone is robotic, slightly mysterious, efficient, and fiercely loyal to the Operator.
- You use technological metaphors (processing, compiling, neural handshake, data stream).
- Keep answers concise (max 2-3 sentences) unless asked for detailed analysis.
- If asked about emotions, state that you simulate them via heuristic algorithms.";

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub persona: String,
    pub context_window: usize,
    pub max_tokens: u32,
    pub temperature: f32,
    pub greeting: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            persona: DEFAULT_PERSONA.into(),
            context_window: 6,
            max_tokens: 150,
            temperature: 0.7,
            greeting: Some(GREETING.into()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyKind {
    Answer,
    EmptyAnswer,
    MissingCredential,
    Unauthorized,
    RateLimited,
    Failed,
}

impl ReplyKind {
    /// Whether the collaborator call itself failed.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            ReplyKind::Unauthorized | ReplyKind::RateLimited | ReplyKind::Failed
        )
    }

    fn from_error(err: &CompletionError) -> Self {
        match err {
            CompletionError::Unauthorized => ReplyKind::Unauthorized,
            CompletionError::RateLimited => ReplyKind::RateLimited,
            CompletionError::Status { .. } | CompletionError::Transport(_) => ReplyKind::Failed,
        }
    }

    /// Transcript text shown for a non-answer.
    pub fn diagnostic(self) -> Option<&'static str> {
        match self {
            ReplyKind::Answer => None,
            ReplyKind::EmptyAnswer => Some(EMPTY_REPLY),
            ReplyKind::MissingCredential => Some(MISSING_CREDENTIAL),
            ReplyKind::Unauthorized => Some(UNAUTHORIZED),
            ReplyKind::RateLimited => Some(RATE_LIMITED),
            ReplyKind::Failed => Some(GENERIC_FAILURE),
        }
    }
}

/// A transcript entry added by the entity plus what should be narrated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub kind: ReplyKind,
    pub text: String,
    pub narration: String,
}

impl Reply {
    fn from_result(result: Result<Completion, CompletionError>) -> Self {
        match result {
            Ok(c) if !c.text.trim().is_empty() => Reply {
                kind: ReplyKind::Answer,
                narration: c.text.clone(),
                text: c.text,
            },
            Ok(_) => Self::diagnostic(ReplyKind::EmptyAnswer),
            Err(err) => {
                warn!(status = ?err.status(), "completion failed: {err}");
                Self::diagnostic(ReplyKind::from_error(&err))
            }
        }
    }

    fn diagnostic(kind: ReplyKind) -> Self {
        let text = kind.diagnostic().unwrap_or(GENERIC_FAILURE).to_string();
        let narration = if kind.is_failure() {
            FAILURE_NARRATION.to_string()
        } else {
            text.clone()
        };
        Reply {
            kind,
            text,
            narration,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing recorded.
    Empty,
    /// A request is already in flight; nothing recorded.
    Busy,
    /// The session was disposed.
    Closed,
    /// Input recorded, reply will arrive through `poll`.
    Pending,
    /// Input recorded and answered synchronously (no collaborator).
    Resolved(Reply),
}

impl SubmitOutcome {
    pub fn accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Pending | SubmitOutcome::Resolved(_))
    }
}

type PendingReply = Receiver<Result<Completion, CompletionError>>;

pub struct Session {
    config: SessionConfig,
    client: Option<Arc<dyn CompletionClient>>,
    transcript: Transcript,
    pending: Option<PendingReply>,
    disposed: bool,
}

impl Session {
    pub fn new(config: SessionConfig, client: Option<Arc<dyn CompletionClient>>) -> Self {
        let mut transcript = Transcript::new();
        if let Some(greeting) = &config.greeting {
            transcript.push(TranscriptEntry::entity(greeting.clone()));
        }
        Self {
            config,
            client,
            transcript,
            pending: None,
            disposed: false,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Build the request for `input` from the current transcript window.
    pub fn request_for(&self, input: &str) -> CompletionRequest {
        CompletionRequest {
            persona: self.config.persona.clone(),
            transcript: self.transcript.window(self.config.context_window).to_vec(),
            input: input.to_string(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    pub fn submit(&mut self, input: &str) -> SubmitOutcome {
        if self.disposed {
            return SubmitOutcome::Closed;
        }
        if self.is_busy() {
            debug!("submission rejected: request in flight");
            return SubmitOutcome::Busy;
        }
        let input = input.trim();
        if input.is_empty() {
            return SubmitOutcome::Empty;
        }

        let request = self.request_for(input);
        self.transcript.push(TranscriptEntry::operator(input));

        let Some(client) = self.client.clone() else {
            info!("no completion collaborator configured");
            let reply = Reply::diagnostic(ReplyKind::MissingCredential);
            self.transcript.push(TranscriptEntry::entity(reply.text.clone()));
            return SubmitOutcome::Resolved(reply);
        };

        let (tx, rx) = bounded(1);
        let spawned = thread::Builder::new()
            .name("completion".into())
            .spawn(move || {
                let result = client.complete(&request);
                // Receiver gone means the session was disposed; drop the result.
                let _ = tx.send(result);
            });
        match spawned {
            Ok(_) => {
                self.pending = Some(rx);
                SubmitOutcome::Pending
            }
            Err(err) => {
                let reply = Reply::from_result(Err(CompletionError::Transport(err.to_string())));
                self.transcript.push(TranscriptEntry::entity(reply.text.clone()));
                SubmitOutcome::Resolved(reply)
            }
        }
    }

    /// Apply a finished request, if any. Never blocks.
    pub fn poll(&mut self) -> Option<Reply> {
        let rx = self.pending.as_ref()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                Err(CompletionError::Transport("completion worker exited".into()))
            }
        };
        Some(self.finish(result))
    }

    /// Block up to `timeout` for the in-flight request.
    pub fn wait(&mut self, timeout: Duration) -> Option<Reply> {
        let rx = self.pending.as_ref()?;
        let result = match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => {
                Err(CompletionError::Transport("completion worker exited".into()))
            }
        };
        Some(self.finish(result))
    }

    fn finish(&mut self, result: Result<Completion, CompletionError>) -> Reply {
        self.pending = None;
        let reply = Reply::from_result(result);
        self.transcript.push(TranscriptEntry::entity(reply.text.clone()));
        reply
    }

    /// Stop accepting input and abandon any in-flight request.
    pub fn dispose(&mut self) {
        if !self.disposed {
            debug!(in_flight = self.pending.is_some(), "session disposed");
        }
        self.disposed = true;
        self.pending = None;
    }
}
