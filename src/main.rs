//! Application entry point — cuecard terminal session.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Load the card knowledge base.
//! 4. Build the LLM matcher / generator backends from config.
//! 5. Wire the [`Assistant`] with a stdin transcription source — typed
//!    lines stand in for speech fragments.
//! 6. Start the session and render matched cards to the terminal until
//!    Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use cuecard::assistant::Assistant;
use cuecard::cards::{Card, CardOrigin, CardStore};
use cuecard::config::{AppConfig, AppPaths};
use cuecard::listen::ConsoleSource;
use cuecard::matcher::{ApiGenerator, ApiMatcher};
use cuecard::session::SessionSnapshot;
use cuecard::transcript::FileSink;

/// How often the terminal view re-polls the session snapshot.
const RENDER_INTERVAL: Duration = Duration::from_millis(250);

/// Stdin read timeout — stands in for the speech provider's listen timeout.
const READ_TIMEOUT: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Terminal rendering
// ---------------------------------------------------------------------------

fn render_card(card: &Card) {
    let origin = match card.origin {
        CardOrigin::Authored => "",
        CardOrigin::Generated => " (generated)",
    };
    println!("\n{}", "=".repeat(40));
    println!("MATCH FOUND: {}{origin}", card.topic);
    println!("{}", card.content);
    println!("{}\n", "=".repeat(40));
}

/// Print whatever changed since the last poll.
fn render_changes(snap: &SessionSnapshot, shown_card: &mut Option<String>, shown_error: &mut Option<String>) {
    let current_id = snap.current_card.as_ref().map(|c| c.id.clone());
    if current_id != *shown_card {
        if let Some(card) = &snap.current_card {
            render_card(card);
        }
        *shown_card = current_id;
    }

    if snap.last_error != *shown_error {
        if let Some(message) = &snap.last_error {
            eprintln!("⚠ backend degraded: {message}");
        }
        *shown_error = snap.last_error.clone();
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // The key can live in the environment instead of settings.toml.
    if config.llm.api_key.is_none() {
        config.llm.api_key = std::env::var("GROQ_API_KEY").ok();
    }
    if config.llm.api_key.is_none() {
        log::warn!("no API key configured — match/generate calls will fail until one is set");
    }

    // 3. Knowledge base
    let paths = AppPaths::new();
    let store = Arc::new(CardStore::load_or_default(paths.cards_file.clone()));
    log::info!(
        "loaded {} cards from {}",
        store.len(),
        paths.cards_file.display()
    );

    // 4 + 5. Collaborators and assistant
    let assistant = Assistant::new(
        config.clone(),
        Arc::new(ConsoleSource::new(READ_TIMEOUT)),
        Arc::new(ApiMatcher::from_config(&config.llm, Arc::clone(&store))),
        Arc::new(ApiGenerator::from_config(&config.llm)),
        store,
        Arc::new(FileSink::new(paths.transcripts_dir.clone())),
    );

    // 6. Run until Ctrl-C
    println!("cuecard session started — type what the interviewer says, Ctrl-C to stop");
    println!("{}", "-".repeat(55));
    assistant.start();

    let mut shown_card: Option<String> = None;
    let mut shown_error: Option<String> = None;
    let mut ticker = tokio::time::interval(RENDER_INTERVAL);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let snap = assistant.poll();
                render_changes(&snap, &mut shown_card, &mut shown_error);
            }
        }
    }

    println!("\nstopping…");
    assistant.stop().await;
    println!("session ended.");

    Ok(())
}
