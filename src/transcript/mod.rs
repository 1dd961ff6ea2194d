//! Session transcript log and its persistence boundary.
//!
//! The coordinator appends one [`TranscriptEntry`] per non-discarded
//! utterance; at session stop the whole log is handed to a
//! [`TranscriptSink`] exactly once (when non-empty) and then cleared.
//! [`FileSink`] writes each session as one JSON file in the transcripts
//! directory.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// TranscriptEntry
// ---------------------------------------------------------------------------

/// One logged utterance, stamped with time elapsed since session start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Seconds since the session started.
    pub elapsed_secs: f32,
    /// The utterance text as transcribed.
    pub text: String,
}

// ---------------------------------------------------------------------------
// SinkError
// ---------------------------------------------------------------------------

/// Errors reported by transcript persistence.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The transcript file could not be written.
    #[error("failed to write transcript: {0}")]
    Io(#[from] std::io::Error),

    /// The transcript could not be serialised.
    #[error("failed to serialise transcript: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// TranscriptSink trait
// ---------------------------------------------------------------------------

/// Persistence boundary for finished session transcripts.
///
/// Implementations must be `Send + Sync`; the coordinator holds one behind
/// `Arc<dyn TranscriptSink>` and calls it once per stopped session.
pub trait TranscriptSink: Send + Sync {
    /// Persist the full transcript of one session.
    fn persist(&self, entries: &[TranscriptEntry]) -> Result<(), SinkError>;
}

// Compile-time assertion: Box<dyn TranscriptSink> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn TranscriptSink>) {}
};

// ---------------------------------------------------------------------------
// FileSink
// ---------------------------------------------------------------------------

/// Writes each session transcript as `session-<unix-secs>.json` in the
/// transcripts directory, creating it as needed.
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl TranscriptSink for FileSink {
    fn persist(&self, entries: &[TranscriptEntry]) -> Result<(), SinkError> {
        std::fs::create_dir_all(&self.dir)?;

        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let path = self.dir.join(format!("session-{stamp}.json"));

        let data = serde_json::to_string_pretty(entries)?;
        std::fs::write(&path, data)?;

        log::info!(
            "transcript saved: {} ({} entries)",
            path.display(),
            entries.len()
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemorySink (test-only)
// ---------------------------------------------------------------------------

/// Captures persisted batches in memory so tests can assert on exactly what
/// was flushed, and how often.
#[cfg(test)]
pub struct MemorySink {
    pub batches: std::sync::Mutex<Vec<Vec<TranscriptEntry>>>,
}

#[cfg(test)]
impl MemorySink {
    pub fn new() -> Self {
        Self {
            batches: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
impl TranscriptSink for MemorySink {
    fn persist(&self, entries: &[TranscriptEntry]) -> Result<(), SinkError> {
        self.batches.lock().unwrap().push(entries.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
