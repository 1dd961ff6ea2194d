//! Control surface for the session core.
//!
//! [`Assistant`] owns the shared session state and the collaborator handles,
//! and exposes the four operations a presentation layer needs:
//!
//! * [`start`](Assistant::start) — idempotent; resets state and spawns the
//!   coordinator loop.
//! * [`stop`](Assistant::stop) — idempotent; flips the running flag (the
//!   loop's sole stop signal) and joins the loop, so transcript persistence
//!   has completed by the time it returns.
//! * [`poll`](Assistant::poll) — cheap read-only snapshot, safe at high
//!   frequency.
//! * [`rewind`](Assistant::rewind) — pop the card history one step.
//!
//! Plus [`reload_cards`](Assistant::reload_cards), a passthrough to the
//! knowledge-base store that is safe mid-session.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::task::JoinHandle;

use crate::cards::{CardStore, StoreError};
use crate::config::AppConfig;
use crate::listen::TranscriptionSource;
use crate::matcher::{CardGenerator, CardMatcher, MatchPipeline};
use crate::session::state::{new_shared_state, SessionSnapshot, SharedState};
use crate::session::StreamCoordinator;
use crate::transcript::TranscriptSink;

// ---------------------------------------------------------------------------
// Operation outcomes
// ---------------------------------------------------------------------------

/// Result of a `start` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new session was started.
    Started,
    /// A session was already running — nothing changed.
    AlreadyRunning,
}

/// Result of a `stop` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The session was stopped and the loop has exited.
    Stopped,
    /// No session was running — nothing changed.
    NotRunning,
}

/// Result of a `rewind` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewindOutcome {
    /// The previous card is displayed again.
    Rewound {
        /// Topic of the card now showing.
        topic: String,
    },
    /// Nothing to rewind to.
    NoHistory,
}

// ---------------------------------------------------------------------------
// Assistant
// ---------------------------------------------------------------------------

/// Session controller: one instance per process, one session at a time.
pub struct Assistant {
    config: AppConfig,
    state: SharedState,
    source: Arc<dyn TranscriptionSource>,
    matcher: Arc<dyn CardMatcher>,
    generator: Arc<dyn CardGenerator>,
    store: Arc<CardStore>,
    sink: Arc<dyn TranscriptSink>,
    loop_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Assistant {
    /// Wire up an assistant from config and collaborator handles.
    pub fn new(
        config: AppConfig,
        source: Arc<dyn TranscriptionSource>,
        matcher: Arc<dyn CardMatcher>,
        generator: Arc<dyn CardGenerator>,
        store: Arc<CardStore>,
        sink: Arc<dyn TranscriptSink>,
    ) -> Self {
        let state = new_shared_state(&config.session);
        Self {
            config,
            state,
            source,
            matcher,
            generator,
            store,
            sink,
            loop_handle: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Control operations
    // -----------------------------------------------------------------------

    /// Start a session.  No-op when one is already running.
    ///
    /// Must be called from within a tokio runtime — the coordinator loop is
    /// spawned as a task.
    pub fn start(&self) -> StartOutcome {
        {
            let mut st = self.state.lock().unwrap();
            if st.running {
                return StartOutcome::AlreadyRunning;
            }
            st.reset_for_start(Instant::now());
        }

        let coordinator = StreamCoordinator::new(
            Arc::clone(&self.state),
            Arc::clone(&self.source),
            MatchPipeline::new(Arc::clone(&self.matcher), Arc::clone(&self.generator)),
            Arc::clone(&self.sink),
            &self.config.session,
        );

        let handle = tokio::spawn(coordinator.run());
        *self.loop_handle.lock().unwrap() = Some(handle);

        log::info!("session started");
        StartOutcome::Started
    }

    /// Stop the running session.  No-op when none is running.
    ///
    /// The running flag flips immediately; the loop observes it at its next
    /// iteration top (an in-flight collaborator call is not aborted), flushes
    /// the transcript, and exits before this returns.
    pub async fn stop(&self) -> StopOutcome {
        let was_running = {
            let mut st = self.state.lock().unwrap();
            let was = st.running;
            st.running = false;
            was
        };

        if !was_running {
            return StopOutcome::NotRunning;
        }

        let handle = self.loop_handle.lock().unwrap().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                log::warn!("session loop task failed: {e}");
            }
        }

        log::info!("session stopped");
        StopOutcome::Stopped
    }

    /// Snapshot the session state for display.
    pub fn poll(&self) -> SessionSnapshot {
        self.state.lock().unwrap().snapshot()
    }

    /// Go back one card.  The rewound-to card becomes the displayed card and
    /// is *not* re-pushed; the card it replaces is discarded.
    pub fn rewind(&self) -> RewindOutcome {
        let mut st = self.state.lock().unwrap();
        match st.history.pop() {
            Some(card) => {
                let topic = card.topic.clone();
                log::info!("rewind → {topic}");
                st.current_card = Some(card);
                RewindOutcome::Rewound { topic }
            }
            None => RewindOutcome::NoHistory,
        }
    }

    /// Re-read the knowledge base.  Safe mid-session — only the matcher's
    /// reference data is swapped, never session state.
    pub fn reload_cards(&self) -> Result<usize, StoreError> {
        self.store.reload()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
