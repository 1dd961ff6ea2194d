//! Transcription-source boundary.
//!
//! The speech-to-text provider is an external collaborator: the session loop
//! only ever sees [`Utterance`]s pulled through the [`TranscriptionSource`]
//! trait.  Providers emit *fragments*, not full sentences — reassembly is the
//! session layer's job.
//!
//! [`ConsoleSource`] is the bundled implementation: it treats stdin lines as
//! transcribed fragments, which makes a full session drivable from a terminal
//! without any audio stack.

pub mod source;

use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;

pub use source::ConsoleSource;

#[cfg(test)]
pub use source::ScriptedSource;

// ---------------------------------------------------------------------------
// Utterance
// ---------------------------------------------------------------------------

/// One unit of transcribed speech as emitted by the provider.
///
/// Ephemeral — produced by the source, consumed immediately by the
/// coordinator.  `received_at` is the timestamp the buffer-decay policy runs
/// against.
#[derive(Debug, Clone)]
pub struct Utterance {
    /// The transcribed text fragment.
    pub text: String,
    /// When the fragment arrived.
    pub received_at: Instant,
}

impl Utterance {
    /// Wrap `text` with an arrival timestamp of now.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            received_at: Instant::now(),
        }
    }

    /// Wrap `text` with an explicit arrival timestamp (tests drive the decay
    /// policy with fabricated clocks).
    pub fn at(text: impl Into<String>, received_at: Instant) -> Self {
        Self {
            text: text.into(),
            received_at,
        }
    }
}

// ---------------------------------------------------------------------------
// ListenError
// ---------------------------------------------------------------------------

/// Errors from the transcription provider.
///
/// The coordinator treats every variant as "no utterance this cycle" — a
/// flaky provider degrades the session, it never kills it.
#[derive(Debug, Error)]
pub enum ListenError {
    /// Reading from the underlying source failed.
    #[error("transcription source read failed: {0}")]
    Io(#[from] std::io::Error),

    /// The provider reported an error of its own.
    #[error("transcription provider error: {0}")]
    Provider(String),
}

// ---------------------------------------------------------------------------
// TranscriptionSource trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for transcription providers.
///
/// Implementations must be `Send + Sync` so they can be held behind an
/// `Arc<dyn TranscriptionSource>` and polled from the coordinator task.
///
/// # Contract
///
/// - `next` blocks up to the provider's own internal timeout.
/// - `Ok(None)` means "no speech this cycle" (timeout / silence) — the
///   caller idles briefly and retries.
/// - `Err(_)` is recoverable and must be treated exactly like `Ok(None)`.
#[async_trait]
pub trait TranscriptionSource: Send + Sync {
    /// Wait for the next transcribed fragment.
    async fn next(&self) -> Result<Option<Utterance>, ListenError>;
}

// Compile-time assertion: Box<dyn TranscriptionSource> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn TranscriptionSource>) {}
};
