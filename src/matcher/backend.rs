//! Matcher / generator collaborator traits and their error type.
//!
//! Both backends are external LLM services; the session core only ever sees
//! these traits, held behind `Arc<dyn …>`.  Failures are recoverable by
//! design — the pipeline converts them into a sticky status message, never a
//! crash.

use async_trait::async_trait;
use thiserror::Error;

use crate::cards::Card;

// ---------------------------------------------------------------------------
// MatchError
// ---------------------------------------------------------------------------

/// Errors that can occur while consulting a matching backend.
#[derive(Debug, Error)]
pub enum MatchError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("matcher request timed out")]
    Timeout,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse matcher response: {0}")]
    Parse(String),

    /// The backend returned a response with no usable content.
    #[error("matcher returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for MatchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            MatchError::Timeout
        } else {
            MatchError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// CardMatcher trait
// ---------------------------------------------------------------------------

/// Knowledge-base lookup: pick the authored card the query is about, if any.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks as
/// `Arc<dyn CardMatcher>`.
#[async_trait]
pub trait CardMatcher: Send + Sync {
    /// Returns the matched card, or `None` when nothing in the roster fits.
    async fn find_match(&self, query: &str) -> Result<Option<Card>, MatchError>;
}

// ---------------------------------------------------------------------------
// CardGenerator trait
// ---------------------------------------------------------------------------

/// Generative fallback: synthesise a card for a question the knowledge base
/// does not cover.
///
/// `Ok(None)` is an explicit *decline* — the backend judged the input not a
/// genuine question (e.g. the speaker's own answer).  Synthesised cards carry
/// [`CardOrigin::Generated`](crate::cards::CardOrigin) and a time-derived id.
#[async_trait]
pub trait CardGenerator: Send + Sync {
    /// Returns a synthesised card, or `None` as a decline.
    async fn generate(&self, query: &str) -> Result<Option<Card>, MatchError>;
}

// Compile-time assertions: both traits must stay object-safe.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn CardMatcher>, _: Box<dyn CardGenerator>) {}
};
