//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings + knowledge base):
//!   Windows: %APPDATA%\cuecard\
//!   macOS:   ~/Library/Application Support/cuecard/
//!   Linux:   ~/.config/cuecard/
//!
//! Data dir (saved transcripts):
//!   Windows: %LOCALAPPDATA%\cuecard\
//!   macOS:   ~/Library/Application Support/cuecard/
//!   Linux:   ~/.local/share/cuecard/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml` and `cards.json`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to the `cards.json` knowledge base.
    pub cards_file: PathBuf,
    /// Directory where session transcripts are written.
    pub transcripts_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "cuecard";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let cards_file = config_dir.join("cards.json");
        let transcripts_dir = data_dir.join("transcripts");

        Self {
            config_dir,
            settings_file,
            cards_file,
            transcripts_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
