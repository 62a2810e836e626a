//! AI-generated player insights.
//!
//! - [`TextGenerator`]: prompt in, free text out ([`GeminiClient`] over HTTP)
//! - [`InsightRequester`]: builds prompts, parses answers, falls back locally
//! - [`InsightTask`]: debounced loading for the player being viewed

mod generator;
mod requester;
mod task;

pub use generator::{
    GeminiClient, GeminiConfig, InsightError, TextGenerator, DEFAULT_GEMINI_ENDPOINT,
    DEFAULT_GEMINI_MODEL,
};
pub use requester::{
    fallback_insight, fallback_similar, insight_prompt, match_suggestions, parse_suggested_names,
    similar_prompt, InsightRequester, DEFAULT_INSIGHT_TIMEOUT, MAX_SIMILAR, SIMILAR_AGE_RANGE,
};
pub use task::{InsightTask, PlayerInsight, DEBOUNCE_DELAY};
