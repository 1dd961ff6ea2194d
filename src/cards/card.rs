//! The `Card` record — one unit of displayable talking points.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CardOrigin
// ---------------------------------------------------------------------------

/// Where a card came from.
///
/// Authored cards are loaded from the knowledge base and immutable; generated
/// cards are synthesised on the fly by the LLM and never written back into
/// the authored store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardOrigin {
    /// Hand-written entry from `cards.json`.
    Authored,
    /// Synthesised by the generative fallback during a session.
    Generated,
}

impl Default for CardOrigin {
    fn default() -> Self {
        Self::Authored
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// An authored or generated unit of displayable content, keyed by `id`.
///
/// The knowledge base stores `{id, topic, content}`; `origin` defaults to
/// [`CardOrigin::Authored`] when absent so existing card files load
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Stable identity (e.g. `"card_redis"`).
    pub id: String,
    /// Short title shown as the card header.
    pub topic: String,
    /// The talking-points body.
    pub content: String,
    /// Authored vs generated provenance.
    #[serde(default)]
    pub origin: CardOrigin,
}

impl Card {
    /// Build a generated card with a time-derived id (`gen-<unix-millis>`).
    pub fn generated(topic: impl Into<String>, content: impl Into<String>) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);

        Self {
            id: format!("gen-{millis}"),
            topic: topic.into(),
            content: content.into(),
            origin: CardOrigin::Generated,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
