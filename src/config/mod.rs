//! Configuration module for cuecard.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the LLM
//! backends and the session loop, `AppPaths` for cross-platform data
//! directories, and TOML persistence via `AppConfig::load` /
//! `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, LlmConfig, SessionConfig};
