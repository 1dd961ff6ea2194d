//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the LLM matcher / generator backends.
///
/// Both backends speak the OpenAI chat-completions wire format, so a single
/// endpoint block covers them (Groq, OpenAI, Together.ai, LM Studio, vLLM …).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the API endpoint.
    ///
    /// - Groq: `https://api.groq.com/openai`
    /// - OpenAI: `https://api.openai.com`
    pub base_url: String,
    /// API key — `None` for local providers that need no authentication.
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"llama-3.1-8b-instant"`).
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).  Matching wants determinism, so the
    /// default is 0.0.
    pub temperature: f32,
    /// Maximum seconds to wait for a match/generate response before timing
    /// out.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai".into(),
            api_key: None,
            model: "llama-3.1-8b-instant".into(),
            temperature: 0.0,
            timeout_secs: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Timing and capacity knobs for the live session loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds after which a non-empty utterance buffer is considered an
    /// abandoned thought and cleared before the next fragment is absorbed.
    pub buffer_timeout_secs: f32,
    /// Seconds after which a short (< 3 words) buffer is treated as noise
    /// ("thank you", "okay") and dropped rather than merged into the next
    /// query.
    pub noise_decay_secs: f32,
    /// Maximum number of superseded cards kept for rewind.
    pub history_capacity: usize,
    /// Milliseconds the coordinator sleeps when the transcription source had
    /// nothing for it.
    pub idle_poll_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            buffer_timeout_secs: 5.0,
            noise_decay_secs: 2.0,
            history_capacity: 10,
            idle_poll_ms: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use cuecard::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM matcher / generator settings.
    pub llm: LlmConfig,
    /// Session loop timing and capacities.
    pub session: SessionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
