//! cuecard — real-time cue-card assistant for live interviews.
//!
//! Continuously converts speech to text (via an external transcription
//! collaborator) and surfaces the one relevant pre-authored card of talking
//! points.  The interesting part is not the STT or LLM call but the
//! streaming-utterance state machine between them: fragment reassembly with
//! time-based decay, self-echo suppression, a two-stage match/generate
//! decision, and a bounded rewind history — all feeding a stable,
//! low-flicker "current card" the UI can poll.
//!
//! # Architecture
//!
//! ```text
//! TranscriptionSource ──fragment──▶ StreamCoordinator
//!                                     ├─ echo?        (session::echo)
//!                                     ├─ buffer       (session::buffer)
//!                                     ├─ MatchPipeline(matcher::pipeline)
//!                                     │    ├─ CardMatcher   (knowledge base)
//!                                     │    └─ CardGenerator (fallback)
//!                                     └─ SessionState (card, history,
//!                                                      transcript)
//! Assistant: start / stop / poll / rewind / reload_cards
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use cuecard::assistant::Assistant;
//! use cuecard::cards::CardStore;
//! use cuecard::config::{AppConfig, AppPaths};
//! use cuecard::listen::ConsoleSource;
//! use cuecard::matcher::{ApiGenerator, ApiMatcher};
//! use cuecard::transcript::FileSink;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::load().unwrap();
//!     let paths = AppPaths::new();
//!     let store = Arc::new(CardStore::load_or_default(paths.cards_file));
//!
//!     let assistant = Assistant::new(
//!         config.clone(),
//!         Arc::new(ConsoleSource::new(Duration::from_secs(2))),
//!         Arc::new(ApiMatcher::from_config(&config.llm, Arc::clone(&store))),
//!         Arc::new(ApiGenerator::from_config(&config.llm)),
//!         store,
//!         Arc::new(FileSink::new(paths.transcripts_dir)),
//!     );
//!
//!     assistant.start();
//!     // … poll() from the presentation layer …
//!     assistant.stop().await;
//! }
//! ```

pub mod assistant;
pub mod cards;
pub mod config;
pub mod listen;
pub mod matcher;
pub mod session;
pub mod transcript;
