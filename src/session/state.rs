//! Session state — the single source of truth for one live session.
//!
//! [`SessionState`] ties together the running flag, the utterance buffer,
//! the displayed card, the rewind history, and the transcript log.  It is
//! held behind [`SharedState`] (`Arc<Mutex<SessionState>>`) — cheap to clone
//! and safe to share between the coordinator task and the control surface.
//!
//! Single-writer discipline: during a session only the coordinator mutates
//! buffer / card / history / transcript; `start` / `stop` flip `running` and
//! reset state; everyone else reads a [`SessionSnapshot`] via `poll`.
//! Lock with `.lock().unwrap()` for a short critical section; do **not**
//! hold the lock across `.await` points.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde::Serialize;

use crate::cards::{Card, CardHistory};
use crate::config::SessionConfig;
use crate::session::buffer::UtteranceBuffer;
use crate::transcript::TranscriptEntry;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Mutable state of one session, from start to stop.
pub struct SessionState {
    /// True between session start and stop; the coordinator's sole stop
    /// signal, checked at loop top.
    pub running: bool,

    /// Accumulated, not-yet-matched query text.
    pub buffer: UtteranceBuffer,

    /// The card currently shown to the user; `None` initially.
    pub current_card: Option<Card>,

    /// Superseded cards, most recent on top, for rewind.
    pub history: CardHistory,

    /// Append-only utterance log for the duration of the session; drained
    /// exactly once at stop.
    pub transcript: Vec<TranscriptEntry>,

    /// Basis for transcript elapsed-time stamps.
    pub session_start: Instant,

    /// Sticky backend-failure message; set by the coordinator, cleared only
    /// by the next start/stop cycle — never by a later successful call.
    pub last_error: Option<String>,
}

impl SessionState {
    /// Create a fresh, not-running state with the configured capacities.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            running: false,
            buffer: UtteranceBuffer::from_config(config),
            current_card: None,
            history: CardHistory::new(config.history_capacity),
            transcript: Vec::new(),
            session_start: Instant::now(),
            last_error: None,
        }
    }

    /// Reset everything for a new session starting at `now`.
    pub fn reset_for_start(&mut self, now: Instant) {
        self.running = true;
        self.buffer.clear();
        self.buffer.touch(now);
        self.current_card = None;
        self.history.clear();
        self.transcript.clear();
        self.session_start = now;
        self.last_error = None;
    }

    /// Clone out everything a presentation layer needs.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            running: self.running,
            buffered_text: self.buffer.text().to_string(),
            current_card: self.current_card.clone(),
            history_len: self.history.len(),
            transcript: self.transcript.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionSnapshot
// ---------------------------------------------------------------------------

/// Read-only view returned by `poll` — safe to call at high frequency, no
/// side effects beyond reading state.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub running: bool,
    pub buffered_text: String,
    pub current_card: Option<Card>,
    pub history_len: usize,
    pub transcript: Vec<TranscriptEntry>,
    pub last_error: Option<String>,
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`SessionState`].
pub type SharedState = Arc<Mutex<SessionState>>;

/// Construct a new [`SharedState`] with the configured capacities.
pub fn new_shared_state(config: &SessionConfig) -> SharedState {
    Arc::new(Mutex::new(SessionState::new(config)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
