//! JSON-backed knowledge base of authored cards.
//!
//! [`CardStore`] loads a `cards.json` array of `{id, topic, content}` records
//! and shares it behind an internal lock so the matcher can read the roster
//! while a control operation reloads it.  A reload swaps the whole list in
//! one step — reference data only, never session state — so it is safe
//! mid-session.

use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

use super::card::Card;

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Errors reported by knowledge-base operations.
///
/// These surface to the caller of the specific operation (load / reload);
/// they are never fatal to a running session.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The card file could not be read.
    #[error("failed to read card file: {0}")]
    Io(#[from] std::io::Error),

    /// The card file is not a valid JSON card array.
    #[error("failed to parse card file: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// CardStore
// ---------------------------------------------------------------------------

/// Shared, reloadable card roster.
///
/// Held behind `Arc<CardStore>` by the matcher and by the control surface.
pub struct CardStore {
    cards: Mutex<Vec<Card>>,
    path: PathBuf,
}

impl CardStore {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Load the knowledge base from `path`.
    ///
    /// A missing file is a valid empty knowledge base (first-run scenario);
    /// an unreadable or malformed file is an error.
    pub fn load(path: PathBuf) -> Result<Self, StoreError> {
        let cards = Self::read_cards(&path)?;
        Ok(Self {
            cards: Mutex::new(cards),
            path,
        })
    }

    /// Load the knowledge base, falling back to an empty roster on failure.
    ///
    /// The failure is logged so a broken `cards.json` does not go unnoticed,
    /// but the session can still run (generative fallback only).
    pub fn load_or_default(path: PathBuf) -> Self {
        match Self::read_cards(&path) {
            Ok(cards) => Self {
                cards: Mutex::new(cards),
                path,
            },
            Err(e) => {
                log::warn!("could not load cards from {}: {e}", path.display());
                Self {
                    cards: Mutex::new(Vec::new()),
                    path,
                }
            }
        }
    }

    fn read_cards(path: &PathBuf) -> Result<Vec<Card>, StoreError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(path)?;
        let cards: Vec<Card> = serde_json::from_str(&data)?;
        Ok(cards)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Snapshot of the current roster.
    pub fn cards(&self) -> Vec<Card> {
        self.cards.lock().unwrap().clone()
    }

    /// Look up an authored card by id.
    pub fn find(&self, id: &str) -> Option<Card> {
        self.cards
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    /// Number of cards currently loaded.
    pub fn len(&self) -> usize {
        self.cards.lock().unwrap().len()
    }

    /// Returns `true` when the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -----------------------------------------------------------------------
    // Reload
    // -----------------------------------------------------------------------

    /// Re-read the card file and swap the roster, returning the new count.
    ///
    /// On failure the previous roster is left untouched.
    pub fn reload(&self) -> Result<usize, StoreError> {
        let fresh = Self::read_cards(&self.path)?;
        let count = fresh.len();
        *self.cards.lock().unwrap() = fresh;
        log::info!("card store reloaded: {count} cards");
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_cards(path: &std::path::Path, json: &str) {
        std::fs::write(path, json).expect("write cards");
    }

    const TWO_CARDS: &str = r#"[
        {"id": "card_redis", "topic": "Redis", "content": "In-memory data store."},
        {"id": "card_react", "topic": "React Hooks", "content": "useState and friends."}
    ]"#;

    #[test]
    fn missing_file_is_an_empty_store() {
        let dir = tempdir().expect("temp dir");
        let store = CardStore::load(dir.path().join("cards.json")).expect("load");
        assert!(store.is_empty());
    }

    #[test]
    fn loads_cards_from_json() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("cards.json");
        write_cards(&path, TWO_CARDS);

        let store = CardStore::load(path).expect("load");
        assert_eq!(store.len(), 2);
        assert_eq!(store.find("card_redis").map(|c| c.topic), Some("Redis".into()));
        assert!(store.find("card_missing").is_none());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("cards.json");
        write_cards(&path, "{not json");

        assert!(CardStore::load(path).is_err());
    }

    #[test]
    fn load_or_default_swallows_malformed_json() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("cards.json");
        write_cards(&path, "{not json");

        let store = CardStore::load_or_default(path);
        assert!(store.is_empty());
    }

    #[test]
    fn reload_picks_up_new_cards() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("cards.json");
        write_cards(&path, "[]");

        let store = CardStore::load(path.clone()).expect("load");
        assert!(store.is_empty());

        write_cards(&path, TWO_CARDS);
        let count = store.reload().expect("reload");
        assert_eq!(count, 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn failed_reload_keeps_previous_roster() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("cards.json");
        write_cards(&path, TWO_CARDS);

        let store = CardStore::load(path.clone()).expect("load");
        write_cards(&path, "broken");

        assert!(store.reload().is_err());
        assert_eq!(store.len(), 2);
    }
}
