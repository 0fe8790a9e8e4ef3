//! AI insight client.
//!
//! Sends calculations and word problems to a text-generation service and
//! validates the structured answers before they reach the controller.

mod backend;
mod client;
mod error;
mod insight;
mod prompt;
mod schema;
#[cfg(test)]
pub(crate) mod testing;

pub use backend::{
    CompletionBackend, DEFAULT_API_KEY_ENV, DEFAULT_MODEL, GeminiBackend, resolve_api_key,
};
pub use client::{DEFAULT_TIMEOUT, InsightClient};
pub use error::{InsightError, InsightErrorKind, InsightResult};
pub use insight::{AiInsight, WordProblemAnswer};
pub use prompt::{explain_prompt, word_problem_prompt};
pub use schema::{ResponseSchema, parse_response};
