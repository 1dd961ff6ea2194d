//! HTTP matcher / generator backends.
//!
//! [`ApiMatcher`] and [`ApiGenerator`] call any OpenAI-compatible
//! `/v1/chat/completions` endpoint — Groq, OpenAI, LM Studio, vLLM, Ollama
//! (OpenAI mode), etc.  All connection details come from [`LlmConfig`];
//! nothing is hardcoded.
//!
//! Both request a JSON-object response and parse the reply strictly; a
//! malformed reply is a [`MatchError::Parse`], not a silent miss.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::cards::{Card, CardStore};
use crate::config::LlmConfig;
use crate::matcher::backend::{CardGenerator, CardMatcher, MatchError};
use crate::matcher::prompt::PromptBuilder;

// ---------------------------------------------------------------------------
// Shared chat-completions call
// ---------------------------------------------------------------------------

fn build_client(config: &LlmConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// POST one `(system, user)` exchange and return the assistant message text.
///
/// The `Authorization: Bearer …` header is attached **only** when
/// `config.api_key` is a non-empty string — safe for local providers that
/// require no authentication.
async fn chat(
    client: &reqwest::Client,
    config: &LlmConfig,
    system_msg: &str,
    user_msg: &str,
) -> Result<String, MatchError> {
    let url = format!("{}/v1/chat/completions", config.base_url);

    let body = serde_json::json!({
        "model":       config.model,
        "messages": [
            { "role": "system", "content": system_msg },
            { "role": "user",   "content": user_msg   }
        ],
        "response_format": { "type": "json_object" },
        "stream":      false,
        "temperature": config.temperature,
        "max_tokens":  512
    });

    let mut req = client.post(&url).json(&body);

    let key = config.api_key.as_deref().unwrap_or("");
    if !key.is_empty() {
        req = req.bearer_auth(key);
    }

    let response = req.send().await?;

    let json: serde_json::Value = response
        .json()
        .await
        .map_err(|e| MatchError::Parse(e.to_string()))?;

    let content = json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or(MatchError::EmptyResponse)?
        .trim()
        .to_string();

    if content.is_empty() {
        return Err(MatchError::EmptyResponse);
    }

    Ok(content)
}

// ---------------------------------------------------------------------------
// ApiMatcher
// ---------------------------------------------------------------------------

/// Reply shape for a match call.
#[derive(Debug, Deserialize)]
struct MatchReply {
    best_match_id: Option<String>,
}

/// Knowledge-base matcher backed by an LLM endpoint.
///
/// The card roster is read from the shared [`CardStore`] on every call, so a
/// runtime `reload` is picked up without rebuilding the matcher.
pub struct ApiMatcher {
    client: reqwest::Client,
    config: LlmConfig,
    store: Arc<CardStore>,
    prompts: PromptBuilder,
}

impl ApiMatcher {
    /// Build an `ApiMatcher` from application config and the shared roster.
    pub fn from_config(config: &LlmConfig, store: Arc<CardStore>) -> Self {
        Self {
            client: build_client(config),
            config: config.clone(),
            store,
            prompts: PromptBuilder::new(),
        }
    }
}

#[async_trait]
impl CardMatcher for ApiMatcher {
    async fn find_match(&self, query: &str) -> Result<Option<Card>, MatchError> {
        let cards = self.store.cards();
        if cards.is_empty() {
            return Ok(None);
        }

        let (system, user) = self.prompts.match_messages(&cards, query);
        let content = chat(&self.client, &self.config, &system, &user).await?;

        let reply: MatchReply =
            serde_json::from_str(&content).map_err(|e| MatchError::Parse(e.to_string()))?;

        // Models occasionally reply with the literal string "null".
        let id = match reply.best_match_id.as_deref() {
            None | Some("") | Some("null") => return Ok(None),
            Some(id) => id,
        };

        match self.store.find(id) {
            Some(card) => Ok(Some(card)),
            None => {
                log::warn!("matcher returned unknown card id {id:?}");
                Ok(None)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ApiGenerator
// ---------------------------------------------------------------------------

/// Reply shape for a generate call.
#[derive(Debug, Deserialize)]
struct GenerateReply {
    #[serde(default)]
    valid: bool,
    #[serde(default)]
    topic: String,
    #[serde(default)]
    content: String,
}

/// Generative fallback backed by an LLM endpoint.
///
/// Declines (`Ok(None)`) when the backend judges the input not a genuine
/// question, or when the synthesised card is missing a topic or body.
pub struct ApiGenerator {
    client: reqwest::Client,
    config: LlmConfig,
    prompts: PromptBuilder,
}

impl ApiGenerator {
    /// Build an `ApiGenerator` from application config.
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            client: build_client(config),
            config: config.clone(),
            prompts: PromptBuilder::new(),
        }
    }
}

#[async_trait]
impl CardGenerator for ApiGenerator {
    async fn generate(&self, query: &str) -> Result<Option<Card>, MatchError> {
        let (system, user) = self.prompts.generate_messages(query);
        let content = chat(&self.client, &self.config, &system, &user).await?;

        let reply: GenerateReply =
            serde_json::from_str(&content).map_err(|e| MatchError::Parse(e.to_string()))?;

        if !reply.valid || reply.topic.trim().is_empty() || reply.content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(Card::generated(
            reply.topic.trim(),
            reply.content.trim(),
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
