//! Transcription source implementations.
//!
//! [`ConsoleSource`] reads stdin lines as transcribed fragments — the
//! terminal stands in for the speech-to-text provider, so the whole session
//! loop (buffering, echo suppression, matching) can be exercised end to end
//! by typing.  [`ScriptedSource`] (test-only) replays a canned fragment
//! sequence.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use super::{ListenError, TranscriptionSource, Utterance};

// ---------------------------------------------------------------------------
// ConsoleSource
// ---------------------------------------------------------------------------

/// Stdin-backed transcription source.
///
/// Each line is one fragment.  `next` resolves `Ok(None)` after
/// `read_timeout` of no input, mirroring a speech provider's listen timeout,
/// and also after end-of-input.
pub struct ConsoleSource {
    lines: Mutex<Lines<BufReader<Stdin>>>,
    read_timeout: Duration,
}

impl ConsoleSource {
    /// Wrap stdin with the given per-read timeout.
    pub fn new(read_timeout: Duration) -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
            read_timeout,
        }
    }
}

#[async_trait]
impl TranscriptionSource for ConsoleSource {
    async fn next(&self) -> Result<Option<Utterance>, ListenError> {
        let mut lines = self.lines.lock().await;

        match tokio::time::timeout(self.read_timeout, lines.next_line()).await {
            // Timed out — no speech this cycle.
            Err(_) => Ok(None),
            // End of input.
            Ok(Ok(None)) => Ok(None),
            Ok(Ok(Some(line))) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(Utterance::new(line)))
                }
            }
            Ok(Err(e)) => Err(ListenError::Io(e)),
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptedSource (test-only)
// ---------------------------------------------------------------------------

/// Replays a fixed sequence of fragments (or provider errors), then reports
/// silence forever.  Used to unit-test the coordinator without a terminal.
#[cfg(test)]
pub struct ScriptedSource {
    script: Mutex<std::collections::VecDeque<Result<Utterance, ListenError>>>,
}

#[cfg(test)]
impl ScriptedSource {
    /// Build a source that yields each text once, stamped at call time.
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script = fragments
            .into_iter()
            .map(|s| Ok(Utterance::new(s.into())))
            .collect();
        Self {
            script: Mutex::new(script),
        }
    }

    /// Build a source from explicit per-call results.
    pub fn from_results(results: Vec<Result<Utterance, ListenError>>) -> Self {
        Self {
            script: Mutex::new(results.into()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl TranscriptionSource for ScriptedSource {
    async fn next(&self) -> Result<Option<Utterance>, ListenError> {
        match self.script.lock().await.pop_front() {
            Some(Ok(utterance)) => Ok(Some(utterance)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_source_replays_then_goes_silent() {
        let source = ScriptedSource::new(["tell me about", "redis"]);

        let first = source.next().await.expect("ok");
        assert_eq!(first.map(|u| u.text), Some("tell me about".into()));

        let second = source.next().await.expect("ok");
        assert_eq!(second.map(|u| u.text), Some("redis".into()));

        assert!(source.next().await.expect("ok").is_none());
        assert!(source.next().await.expect("ok").is_none());
    }

    #[tokio::test]
    async fn scripted_source_surfaces_injected_errors() {
        let source = ScriptedSource::from_results(vec![
            Err(ListenError::Provider("engine overloaded".into())),
            Ok(Utterance::new("still alive")),
        ]);

        assert!(source.next().await.is_err());
        let next = source.next().await.expect("ok");
        assert_eq!(next.map(|u| u.text), Some("still alive".into()));
    }
}
