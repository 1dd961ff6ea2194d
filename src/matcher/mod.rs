//! Card matching for live sessions.
//!
//! This module provides:
//! * [`CardMatcher`] / [`CardGenerator`] — async traits for the two LLM
//!   backends.
//! * [`ApiMatcher`] / [`ApiGenerator`] — OpenAI-compatible REST
//!   implementations.
//! * [`MatchPipeline`] — the two-stage local-then-generative decision policy.
//! * [`PromptBuilder`] — builds the roster and card-synthesis prompts.
//! * [`MatchError`] — error variants for backend calls.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cuecard::cards::CardStore;
//! use cuecard::config::AppConfig;
//! use cuecard::matcher::{ApiGenerator, ApiMatcher, MatchPipeline};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let store = Arc::new(CardStore::load_or_default("cards.json".into()));
//!
//!     let pipeline = MatchPipeline::new(
//!         Arc::new(ApiMatcher::from_config(&config.llm, Arc::clone(&store))),
//!         Arc::new(ApiGenerator::from_config(&config.llm)),
//!     );
//!
//!     let outcome = pipeline.process("tell me about redis").await;
//!     if let Some(card) = outcome.card {
//!         println!("{}: {}", card.topic, card.content);
//!     }
//! }
//! ```

pub mod api;
pub mod backend;
pub mod pipeline;
pub mod prompt;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use api::{ApiGenerator, ApiMatcher};
pub use backend::{CardGenerator, CardMatcher, MatchError};
pub use pipeline::{BufferAction, MatchOutcome, MatchPipeline};
pub use prompt::PromptBuilder;

// test-only re-export so the session test modules can import the mock
// backends without reaching into `pipeline::doubles`.
#[cfg(test)]
pub use pipeline::doubles::{MockGenerator, MockMatcher};
