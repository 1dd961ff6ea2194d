//! Utterance buffer — reassembles fragmented speech into one query.
//!
//! Transcription providers emit fragments, not sentences.  The buffer
//! concatenates successive non-echo fragments into a candidate query while
//! two time-based policies discard text that is no longer worth merging:
//!
//! * **Timeout eviction** — a buffer untouched for longer than the timeout
//!   (default 5 s) is an abandoned thought; it is dropped before the next
//!   fragment is absorbed.
//! * **Short-buffer decay** — a buffer of fewer than 3 words that sat for
//!   longer than the decay window (default 2 s) is noise ("thank you",
//!   "okay") and is dropped rather than merged into the next real query.
//!
//! This is a best-effort heuristic, not exact segmentation; the match
//! pipeline tolerates run-on and incomplete queries.

use std::time::{Duration, Instant};

use crate::config::SessionConfig;

/// Buffers below this word count are subject to the decay policy.
const SHORT_BUFFER_WORDS: usize = 3;

// ---------------------------------------------------------------------------
// UtteranceBuffer
// ---------------------------------------------------------------------------

/// Accumulated, not-yet-matched query text with decay timestamps.
#[derive(Debug, Clone)]
pub struct UtteranceBuffer {
    text: String,
    last_update: Instant,
    timeout: Duration,
    decay: Duration,
}

impl UtteranceBuffer {
    /// Create an empty buffer with explicit policy windows.
    pub fn new(timeout: Duration, decay: Duration) -> Self {
        Self {
            text: String::new(),
            last_update: Instant::now(),
            timeout,
            decay,
        }
    }

    /// Create an empty buffer using the configured windows.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            Duration::from_secs_f32(config.buffer_timeout_secs),
            Duration::from_secs_f32(config.noise_decay_secs),
        )
    }

    // -----------------------------------------------------------------------
    // Absorption
    // -----------------------------------------------------------------------

    /// Apply the decay policies, merge `fragment`, and return the assembled
    /// candidate query.
    ///
    /// The buffer retains the assembled text; the coordinator clears it
    /// afterwards when the pipeline says so.  `now` is the fragment's
    /// arrival time — both eviction checks run against the gap between the
    /// previous update and this arrival.
    pub fn absorb(&mut self, fragment: &str, now: Instant) -> String {
        let gap = now.saturating_duration_since(self.last_update);

        // Timeout eviction: the previous partial thought was abandoned.
        if !self.text.is_empty() && gap > self.timeout {
            log::debug!("buffer timeout — dropping {:?}", self.text);
            self.text.clear();
        }

        self.last_update = now;

        // Short-buffer decay: lingering politeness/noise fragments.
        if !self.text.is_empty()
            && self.text.split_whitespace().count() < SHORT_BUFFER_WORDS
            && gap > self.decay
        {
            log::debug!("buffer decay — dropping {:?}", self.text);
            self.text.clear();
        }

        let assembled = if self.text.is_empty() {
            fragment.trim().to_string()
        } else {
            format!("{} {}", self.text, fragment.trim())
        };

        self.text = assembled.clone();
        assembled
    }

    /// Refresh the decay timestamp without touching the text (echo case).
    pub fn touch(&mut self, now: Instant) {
        self.last_update = now;
    }

    /// Drop the pending text (match succeeded, or a dead end).
    pub fn clear(&mut self) {
        self.text.clear();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The pending, not-yet-matched query text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns `true` when no partial utterance is pending.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
