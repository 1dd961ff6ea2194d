//! Two-stage match/generate decision pipeline.
//!
//! Stage 1 asks the knowledge-base matcher.  Stage 2 (the expensive
//! generative fallback) runs only for queries long enough to plausibly be a
//! real question, and a long query the generator *declines* is abandoned
//! outright so an unmatchable ramble cannot grow the buffer without bound.
//!
//! ```text
//! query ──▶ local match ──hit──▶ card, Clear
//!             │miss
//!             ├── ≤ 3 words ────▶ no card, Keep
//!             ▼
//!           generate ──card────▶ card, Clear
//!             │decline
//!             ├── > 8 words ───▶ no card, Clear   (dead end)
//!             └── otherwise ───▶ no card, Keep    (still growing)
//! ```
//!
//! Backend failures are never fatal: they count as a miss for the cycle and
//! surface as a status message the session keeps until restarted.

use std::sync::Arc;

use crate::cards::Card;
use crate::matcher::backend::{CardGenerator, CardMatcher};

/// Queries must have *more* than this many words before the generative
/// fallback is consulted.
const MIN_GENERATE_WORDS: usize = 3;

/// A declined query with *more* than this many words is treated as a dead
/// end and cleared instead of retained.
const ABANDON_WORDS: usize = 8;

// ---------------------------------------------------------------------------
// BufferAction / MatchOutcome
// ---------------------------------------------------------------------------

/// What the coordinator should do with the utterance buffer after a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferAction {
    /// Retain the assembled query as a growing partial awaiting more speech.
    Keep,
    /// Discard the assembled query (matched, or judged a dead end).
    Clear,
}

/// Result of one pipeline cycle.
#[derive(Debug)]
pub struct MatchOutcome {
    /// The card to display, if any.
    pub card: Option<Card>,
    /// Buffer disposition.
    pub buffer: BufferAction,
    /// Backend failure message for the sticky session status, if any.
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// MatchPipeline
// ---------------------------------------------------------------------------

/// Drives the two-stage decision for one assembled query.
pub struct MatchPipeline {
    matcher: Arc<dyn CardMatcher>,
    generator: Arc<dyn CardGenerator>,
}

impl MatchPipeline {
    pub fn new(matcher: Arc<dyn CardMatcher>, generator: Arc<dyn CardGenerator>) -> Self {
        Self { matcher, generator }
    }

    /// Evaluate `query` and decide card + buffer disposition.
    ///
    /// Never returns an error; backend failures degrade to "no match this
    /// cycle" with the message carried in [`MatchOutcome::error`].
    pub async fn process(&self, query: &str) -> MatchOutcome {
        let words = query.split_whitespace().count();
        let mut error = None;

        // ── Stage 1: knowledge-base match ────────────────────────────────
        match self.matcher.find_match(query).await {
            Ok(Some(card)) => {
                log::debug!("local match: {} ({})", card.topic, card.id);
                return MatchOutcome {
                    card: Some(card),
                    buffer: BufferAction::Clear,
                    error: None,
                };
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("local match failed: {e}");
                error = Some(e.to_string());
            }
        }

        // ── Stage 2 gate: too-short fragments are not worth a generation ──
        if words <= MIN_GENERATE_WORDS {
            return MatchOutcome {
                card: None,
                buffer: BufferAction::Keep,
                error,
            };
        }

        // ── Stage 2: generative fallback ─────────────────────────────────
        match self.generator.generate(query).await {
            Ok(Some(card)) => {
                log::debug!("generated card: {} ({})", card.topic, card.id);
                MatchOutcome {
                    card: Some(card),
                    buffer: BufferAction::Clear,
                    error,
                }
            }
            Ok(None) => {
                // Declined: a long unmatchable utterance is abandoned rather
                // than grown further.
                let buffer = if words > ABANDON_WORDS {
                    BufferAction::Clear
                } else {
                    BufferAction::Keep
                };
                MatchOutcome {
                    card: None,
                    buffer,
                    error,
                }
            }
            Err(e) => {
                log::warn!("generation failed: {e}");
                MatchOutcome {
                    card: None,
                    buffer: BufferAction::Keep,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Test doubles (shared with the session tests)
// ---------------------------------------------------------------------------

#[cfg(test)]
pub mod doubles {
    //! Mock matcher / generator backends with call counting.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::cards::Card;
    use crate::matcher::backend::{CardGenerator, CardMatcher, MatchError};

    /// Matcher that returns a fixed response, counts calls, and records the
    /// queries it was asked.
    pub struct MockMatcher {
        response: Option<Card>,
        fail: bool,
        pub calls: Arc<AtomicUsize>,
        pub queries: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl MockMatcher {
        pub fn hit(card: Card) -> Self {
            Self {
                response: Some(card),
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
                queries: Arc::new(std::sync::Mutex::new(Vec::new())),
            }
        }

        pub fn miss() -> Self {
            Self {
                response: None,
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
                queries: Arc::new(std::sync::Mutex::new(Vec::new())),
            }
        }

        pub fn failing() -> Self {
            Self {
                response: None,
                fail: true,
                calls: Arc::new(AtomicUsize::new(0)),
                queries: Arc::new(std::sync::Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl CardMatcher for MockMatcher {
        async fn find_match(&self, query: &str) -> Result<Option<Card>, MatchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.to_string());
            if self.fail {
                return Err(MatchError::Request("connection refused".into()));
            }
            Ok(self.response.clone())
        }
    }

    /// Generator that returns a fixed response and counts calls.
    pub struct MockGenerator {
        response: Option<Card>,
        fail: bool,
        pub calls: Arc<AtomicUsize>,
    }

    impl MockGenerator {
        pub fn card(card: Card) -> Self {
            Self {
                response: Some(card),
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn declines() -> Self {
            Self {
                response: None,
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn failing() -> Self {
            Self {
                response: None,
                fail: true,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl CardGenerator for MockGenerator {
        async fn generate(&self, _query: &str) -> Result<Option<Card>, MatchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(MatchError::Timeout);
            }
            Ok(self.response.clone())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
