//! Stream coordinator — drives the transcription → match → display loop.
//!
//! [`StreamCoordinator`] owns the per-session control loop.  One instance is
//! spawned as a tokio task per running session; it is the **only** writer of
//! buffer / card / history / transcript while the session runs.
//!
//! # Loop flow
//!
//! ```text
//! loop top: running still true?          ── no ─▶ flush transcript, exit
//!   └─▶ source.next().await
//!         ├─ None / Err  → idle ~100 ms, retry
//!         └─ utterance
//!              ├─ echo of displayed card → refresh buffer clock only
//!              └─ else → transcript append
//!                        → buffer absorb (timeout + decay policy)
//!                        → pipeline.process(assembled)   [no lock held]
//!                        → apply: buffer action, sticky error,
//!                                 history push-then-set on a new card
//! ```
//!
//! The session mutex is never held across an `.await`: the loop snapshots
//! what it needs, awaits the collaborator, then re-locks to apply.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::SessionConfig;
use crate::listen::{TranscriptionSource, Utterance};
use crate::matcher::{BufferAction, MatchPipeline};
use crate::session::echo;
use crate::session::state::SharedState;
use crate::transcript::{TranscriptEntry, TranscriptSink};

// ---------------------------------------------------------------------------
// StreamCoordinator
// ---------------------------------------------------------------------------

/// Per-session control loop.
///
/// Create with [`StreamCoordinator::new`], then `tokio::spawn(coordinator.run())`.
/// The loop observes `running == false` at its top and exits; it does not
/// abort an in-flight collaborator call.
pub struct StreamCoordinator {
    state: SharedState,
    source: Arc<dyn TranscriptionSource>,
    pipeline: MatchPipeline,
    sink: Arc<dyn TranscriptSink>,
    idle: Duration,
}

impl StreamCoordinator {
    /// Create a new coordinator.
    ///
    /// # Arguments
    ///
    /// * `state`    — shared session state (also read by `poll`).
    /// * `source`   — transcription provider.
    /// * `pipeline` — two-stage match/generate decision pipeline.
    /// * `sink`     — transcript persistence, invoked once at stop.
    pub fn new(
        state: SharedState,
        source: Arc<dyn TranscriptionSource>,
        pipeline: MatchPipeline,
        sink: Arc<dyn TranscriptSink>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            state,
            source,
            pipeline,
            sink,
            idle: Duration::from_millis(config.idle_poll_ms),
        }
    }

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------

    /// Run until the session is stopped.
    ///
    /// On exit the transcript log is drained into the sink (once, when
    /// non-empty) and cleared.
    pub async fn run(self) {
        log::info!("session loop started");

        loop {
            // `running` is the sole stop signal, checked at loop top.
            if !self.state.lock().unwrap().running {
                break;
            }

            match self.source.next().await {
                Ok(Some(utterance)) => self.ingest(utterance).await,
                Ok(None) => tokio::time::sleep(self.idle).await,
                Err(e) => {
                    // Provider hiccups count as silence.
                    log::debug!("transcription error (treated as silence): {e}");
                    tokio::time::sleep(self.idle).await;
                }
            }
        }

        self.flush_transcript();
        log::info!("session loop stopped");
    }

    // -----------------------------------------------------------------------
    // One utterance
    // -----------------------------------------------------------------------

    /// Process a single transcribed fragment.
    async fn ingest(&self, utterance: Utterance) {
        let text = utterance.text.trim().to_string();
        if text.is_empty() {
            return;
        }
        let now = utterance.received_at;

        // ── Echo check + buffer absorb (short lock) ──────────────────────
        let assembled = {
            let mut st = self.state.lock().unwrap();

            let card_content = st
                .current_card
                .as_ref()
                .map(|c| c.content.as_str())
                .unwrap_or("");
            if echo::is_echo(&text, card_content) {
                log::debug!("echo suppressed: {text:?}");
                st.buffer.touch(now);
                return;
            }

            let elapsed = now.saturating_duration_since(st.session_start);
            st.transcript.push(TranscriptEntry {
                elapsed_secs: elapsed.as_secs_f32(),
                text: text.clone(),
            });

            st.buffer.absorb(&text, now)
        };

        log::debug!("query: {assembled:?}");

        // ── Match (no lock across the await) ─────────────────────────────
        let outcome = self.pipeline.process(&assembled).await;

        // ── Apply ────────────────────────────────────────────────────────
        let mut st = self.state.lock().unwrap();

        if let Some(message) = outcome.error {
            // Sticky: stays visible until the next start/stop cycle.
            st.last_error = Some(message);
        }

        match outcome.buffer {
            BufferAction::Clear => st.buffer.clear(),
            // `absorb` already retained the assembled text.
            BufferAction::Keep => {}
        }

        if let Some(card) = outcome.card {
            match st.current_card.take() {
                // Superseded by a different card — a history event.
                Some(prev) if prev.id != card.id => st.history.push(prev),
                // Same card again, or nothing displayed yet.
                _ => {}
            }
            log::info!("card: {} ({})", card.topic, card.id);
            st.current_card = Some(card);
        }
        // On a miss the previous card stays up.
    }

    // -----------------------------------------------------------------------
    // Shutdown
    // -----------------------------------------------------------------------

    /// Drain the transcript log into the sink.  Invoked exactly once, on
    /// loop exit; an empty log skips the sink entirely.
    fn flush_transcript(&self) {
        let entries: Vec<TranscriptEntry> = {
            let mut st = self.state.lock().unwrap();
            std::mem::take(&mut st.transcript)
        };

        if entries.is_empty() {
            return;
        }

        if let Err(e) = self.sink.persist(&entries) {
            log::error!("transcript persistence failed: {e}");
            self.state.lock().unwrap().last_error = Some(e.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, CardOrigin};
    use crate::listen::ScriptedSource;
    use crate::matcher::backend::{CardGenerator, CardMatcher, MatchError};
    use crate::matcher::{MockGenerator, MockMatcher};
    use crate::session::state::new_shared_state;
    use crate::transcript::MemorySink;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Matcher that replays a scripted sequence of results, then misses.
    struct SequenceMatcher {
        script: Mutex<VecDeque<Result<Option<Card>, MatchError>>>,
    }

    impl SequenceMatcher {
        fn new(script: Vec<Result<Option<Card>, MatchError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
            }
        }
    }

    #[async_trait]
    impl CardMatcher for SequenceMatcher {
        async fn find_match(&self, _query: &str) -> Result<Option<Card>, MatchError> {
            self.script.lock().unwrap().pop_front().unwrap_or(Ok(None))
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn card(id: &str) -> Card {
        Card {
            id: id.into(),
            topic: id.to_uppercase(),
            content: format!("content for {id}"),
            origin: CardOrigin::Authored,
        }
    }

    fn test_config() -> SessionConfig {
        SessionConfig {
            idle_poll_ms: 10,
            ..SessionConfig::default()
        }
    }

    fn coordinator_with(
        matcher: Arc<dyn CardMatcher>,
        generator: Arc<dyn CardGenerator>,
    ) -> (StreamCoordinator, SharedState, Arc<MemorySink>) {
        let config = test_config();
        let state = new_shared_state(&config);
        state.lock().unwrap().reset_for_start(Instant::now());

        let sink = Arc::new(MemorySink::new());
        let coordinator = StreamCoordinator::new(
            Arc::clone(&state),
            Arc::new(ScriptedSource::new(Vec::<String>::new())),
            MatchPipeline::new(matcher, generator),
            Arc::clone(&sink) as Arc<dyn TranscriptSink>,
            &config,
        );
        (coordinator, state, sink)
    }

    // -----------------------------------------------------------------------
    // Scenario tests
    // -----------------------------------------------------------------------

    /// Scenario A: empty buffer, a matched query sets the card and clears
    /// the buffer.
    #[tokio::test]
    async fn matched_query_sets_card_and_clears_buffer() {
        let (coordinator, state, _) = coordinator_with(
            Arc::new(MockMatcher::hit(card("card_redis"))),
            Arc::new(MockGenerator::declines()),
        );

        coordinator.ingest(Utterance::new("Tell me about Redis")).await;

        let st = state.lock().unwrap();
        assert_eq!(
            st.current_card.as_ref().map(|c| c.id.as_str()),
            Some("card_redis")
        );
        assert!(st.buffer.is_empty());
        assert_eq!(st.transcript.len(), 1);
    }

    /// Scenario B: reading the displayed card back is suppressed — buffer,
    /// card, and transcript untouched; the matcher is never consulted.
    #[tokio::test]
    async fn echo_leaves_state_untouched() {
        let matcher = MockMatcher::miss();
        let calls = matcher.calls.clone();
        let (coordinator, state, _) =
            coordinator_with(Arc::new(matcher), Arc::new(MockGenerator::declines()));

        {
            let mut st = state.lock().unwrap();
            st.current_card = Some(Card {
                id: "card_redis".into(),
                topic: "Redis".into(),
                content: "Redis is an in-memory data store used as a cache".into(),
                origin: CardOrigin::Authored,
            });
        }

        coordinator
            .ingest(Utterance::new(
                "Redis is an in-memory data store used as a cache",
            ))
            .await;

        let st = state.lock().unwrap();
        assert_eq!(
            st.current_card.as_ref().map(|c| c.id.as_str()),
            Some("card_redis")
        );
        assert!(st.buffer.is_empty());
        assert!(st.transcript.is_empty());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    /// Scenario C: two fragments a second apart are assembled into one
    /// query before matching.
    #[tokio::test]
    async fn fragments_assemble_before_matching() {
        let matcher = MockMatcher::miss();
        let queries = matcher.queries.clone();
        let (coordinator, _, _) =
            coordinator_with(Arc::new(matcher), Arc::new(MockGenerator::declines()));

        let t0 = Instant::now();
        coordinator.ingest(Utterance::at("Tell me about", t0)).await;
        coordinator
            .ingest(Utterance::at("Redis", t0 + Duration::from_secs(1)))
            .await;

        let queries = queries.lock().unwrap();
        assert_eq!(queries.last().map(String::as_str), Some("Tell me about Redis"));
    }

    /// Scenario D: 6 s of silence abandons the pending fragment before the
    /// next one is absorbed.
    #[tokio::test]
    async fn silence_timeout_abandons_the_pending_fragment() {
        let matcher = MockMatcher::miss();
        let queries = matcher.queries.clone();
        let (coordinator, _, _) =
            coordinator_with(Arc::new(matcher), Arc::new(MockGenerator::declines()));

        let t0 = Instant::now();
        coordinator.ingest(Utterance::at("Tell me about", t0)).await;
        coordinator
            .ingest(Utterance::at("Kafka", t0 + Duration::from_secs(6)))
            .await;

        let queries = queries.lock().unwrap();
        assert_eq!(queries.last().map(String::as_str), Some("Kafka"));
    }

    /// Scenario E: a long query the generator declines is abandoned — no
    /// card, buffer cleared.
    #[tokio::test]
    async fn long_declined_query_clears_the_buffer() {
        let (coordinator, state, _) = coordinator_with(
            Arc::new(MockMatcher::miss()),
            Arc::new(MockGenerator::declines()),
        );

        coordinator
            .ingest(Utterance::new(
                "so in my last role I mostly wrote backend services",
            ))
            .await;

        let st = state.lock().unwrap();
        assert!(st.current_card.is_none());
        assert!(st.buffer.is_empty());
    }

    // -----------------------------------------------------------------------
    // Supersession / history
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn superseded_card_is_pushed_to_history() {
        let matcher = SequenceMatcher::new(vec![
            Ok(Some(card("card_redis"))),
            Ok(Some(card("card_react"))),
        ]);
        let (coordinator, state, _) =
            coordinator_with(Arc::new(matcher), Arc::new(MockGenerator::declines()));

        coordinator.ingest(Utterance::new("Tell me about Redis")).await;
        coordinator.ingest(Utterance::new("What about React hooks")).await;

        let mut st = state.lock().unwrap();
        assert_eq!(
            st.current_card.as_ref().map(|c| c.id.as_str()),
            Some("card_react")
        );
        assert_eq!(st.history.len(), 1);
        assert_eq!(st.history.pop().map(|c| c.id), Some("card_redis".into()));
    }

    #[tokio::test]
    async fn repeating_the_same_card_is_not_a_history_event() {
        let matcher = SequenceMatcher::new(vec![
            Ok(Some(card("card_redis"))),
            Ok(Some(card("card_redis"))),
        ]);
        let (coordinator, state, _) =
            coordinator_with(Arc::new(matcher), Arc::new(MockGenerator::declines()));

        coordinator.ingest(Utterance::new("Tell me about Redis")).await;
        coordinator.ingest(Utterance::new("Redis again please")).await;

        let st = state.lock().unwrap();
        assert_eq!(
            st.current_card.as_ref().map(|c| c.id.as_str()),
            Some("card_redis")
        );
        assert!(st.history.is_empty());
    }

    #[tokio::test]
    async fn current_card_is_retained_on_a_miss() {
        let matcher = SequenceMatcher::new(vec![Ok(Some(card("card_redis"))), Ok(None)]);
        let (coordinator, state, _) =
            coordinator_with(Arc::new(matcher), Arc::new(MockGenerator::declines()));

        coordinator.ingest(Utterance::new("Tell me about Redis")).await;
        coordinator.ingest(Utterance::new("hm okay")).await;

        let st = state.lock().unwrap();
        assert_eq!(
            st.current_card.as_ref().map(|c| c.id.as_str()),
            Some("card_redis")
        );
    }

    // -----------------------------------------------------------------------
    // Sticky error
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn backend_failure_is_sticky_across_later_successes() {
        let matcher = SequenceMatcher::new(vec![
            Err(MatchError::Request("connection refused".into())),
            Ok(Some(card("card_redis"))),
        ]);
        let (coordinator, state, _) =
            coordinator_with(Arc::new(matcher), Arc::new(MockGenerator::declines()));

        coordinator.ingest(Utterance::new("um okay")).await;
        assert!(state.lock().unwrap().last_error.is_some());

        coordinator.ingest(Utterance::new("Tell me about Redis")).await;

        let st = state.lock().unwrap();
        assert_eq!(
            st.current_card.as_ref().map(|c| c.id.as_str()),
            Some("card_redis")
        );
        // Still set — cleared only by the next start/stop cycle.
        assert!(st.last_error.is_some());
    }

    // -----------------------------------------------------------------------
    // Transcript ordering
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn transcript_preserves_arrival_order() {
        let (coordinator, state, _) = coordinator_with(
            Arc::new(MockMatcher::miss()),
            Arc::new(MockGenerator::declines()),
        );

        let t0 = Instant::now();
        coordinator.ingest(Utterance::at("first", t0)).await;
        coordinator
            .ingest(Utterance::at("second", t0 + Duration::from_secs(1)))
            .await;
        coordinator
            .ingest(Utterance::at("third", t0 + Duration::from_secs(2)))
            .await;

        let st = state.lock().unwrap();
        let texts: Vec<_> = st.transcript.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    // -----------------------------------------------------------------------
    // Full loop
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn run_loop_matches_and_flushes_transcript_on_stop() {
        let config = test_config();
        let state = new_shared_state(&config);
        state.lock().unwrap().reset_for_start(Instant::now());

        let sink = Arc::new(MemorySink::new());
        let coordinator = StreamCoordinator::new(
            Arc::clone(&state),
            Arc::new(ScriptedSource::new(["Tell me about Redis"])),
            MatchPipeline::new(
                Arc::new(MockMatcher::hit(card("card_redis"))),
                Arc::new(MockGenerator::declines()),
            ),
            Arc::clone(&sink) as Arc<dyn TranscriptSink>,
            &config,
        );

        let handle = tokio::spawn(coordinator.run());
        tokio::time::sleep(Duration::from_millis(100)).await;
        state.lock().unwrap().running = false;
        handle.await.expect("loop task");

        let st = state.lock().unwrap();
        assert_eq!(
            st.current_card.as_ref().map(|c| c.id.as_str()),
            Some("card_redis")
        );
        // Flushed exactly once with the single logged entry, then cleared.
        let batches = sink.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 1);
        assert!(st.transcript.is_empty());
    }

    #[tokio::test]
    async fn run_loop_skips_the_sink_when_nothing_was_logged() {
        let config = test_config();
        let state = new_shared_state(&config);
        state.lock().unwrap().reset_for_start(Instant::now());

        let sink = Arc::new(MemorySink::new());
        let coordinator = StreamCoordinator::new(
            Arc::clone(&state),
            Arc::new(ScriptedSource::new(Vec::<String>::new())),
            MatchPipeline::new(
                Arc::new(MockMatcher::miss()),
                Arc::new(MockGenerator::declines()),
            ),
            Arc::clone(&sink) as Arc<dyn TranscriptSink>,
            &config,
        );

        let handle = tokio::spawn(coordinator.run());
        tokio::time::sleep(Duration::from_millis(50)).await;
        state.lock().unwrap().running = false;
        handle.await.expect("loop task");

        assert!(sink.batches.lock().unwrap().is_empty());
    }
}
