//! Prompt builder for the match and generate backends.
//!
//! [`PromptBuilder`] constructs `(system_msg, user_msg)` pairs for any
//! OpenAI-compatible `/v1/chat/completions` endpoint.  The match prompt
//! embeds the current card roster as one summary line per card; the generate
//! prompt asks the model to either synthesise a card or decline.
//!
//! Both prompts demand a bare JSON object reply so the response can be parsed
//! without scraping.

use crate::cards::Card;

/// Characters of card content included in each roster summary line.
const CONTENT_PREVIEW_CHARS: usize = 50;

// ---------------------------------------------------------------------------
// System instructions
// ---------------------------------------------------------------------------

/// Matching rules — aggressive by design: a strong unique keyword should win
/// immediately, without waiting for a complete sentence.
const MATCH_RULES: &str = "\
Your Task:
Predict the most likely card based on the available text, EVEN IF the sentence is incomplete.

RULES (Aggressive Matching):

1. Keyword Priority:
   - If the text contains strong unique keywords matching a card (e.g., \"Redis\", \"React hooks\", \"Introduction\"), MATCH IMMEDIATELY.
   - Do not wait for a full sentence structure.

2. Partial Context:
   - Input: \"Tell me about Re...\" -> return null (uncertain).
   - Input: \"Tell me about Redis\" -> match the Redis card.

3. Intent Filter:
   - Try to ignore the candidate's own answers.
   - But if ambiguous, err on the side of showing the card.

Output JSON format:
{\"best_match_id\": \"card_id_or_null\"}";

/// Generation rules — the model must judge question-ness first and decline
/// anything that reads as the speaker's own answer.
const GENERATE_RULES: &str = "\
You are a real-time assistant for an interviewee.
The knowledge base has no card for the text below.

Your Task:
1. Decide whether the text is a genuine interviewer question or prompt.
   - The candidate's own answers, filler, and small talk are NOT questions.
2. If it is a genuine question, write a short cue card the candidate can
   glance at while answering: a topic title and 3-5 concise talking points.
3. If it is not a genuine question, decline.

Output JSON format:
{\"valid\": true_or_false, \"topic\": \"short title or empty\", \"content\": \"talking points or empty\"}";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds chat messages for the match and generate calls.
///
/// # Example
/// ```rust
/// use cuecard::matcher::PromptBuilder;
///
/// let builder = PromptBuilder::new();
/// let (system, user) = builder.generate_messages("tell me about your weaknesses");
/// assert!(system.contains("cue card"));
/// assert!(user.contains("weaknesses"));
/// ```
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the `(system, user)` messages for a knowledge-base match call.
    ///
    /// The system message carries the roster, one line per card:
    /// `ID: … | Topic: … | Content Preview: …`.
    pub fn match_messages(&self, cards: &[Card], query: &str) -> (String, String) {
        let roster: String = cards
            .iter()
            .map(Self::summary_line)
            .collect::<Vec<_>>()
            .join("\n");

        let system = format!(
            "You are a real-time assistant for an interviewee.\n\
             Here is the knowledge base (cards):\n{roster}\n\n{MATCH_RULES}"
        );
        let user = format!("User Input: {query}");

        (system, user)
    }

    /// Build the `(system, user)` messages for a generate call.
    pub fn generate_messages(&self, query: &str) -> (String, String) {
        (GENERATE_RULES.to_string(), format!("User Input: {query}"))
    }

    /// One roster line: id, topic, and the first 50 characters of content.
    fn summary_line(card: &Card) -> String {
        let preview: String = card.content.chars().take(CONTENT_PREVIEW_CHARS).collect();
        format!(
            "ID: {} | Topic: {} | Content Preview: {}...",
            card.id, card.topic, preview
        )
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
