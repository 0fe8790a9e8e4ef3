//! Text-generation backends.
//!
//! A backend turns a prompt plus a requested [`ResponseSchema`] into raw
//! response text. It does not interpret the text; validation happens in
//! [`InsightClient`](super::InsightClient).

use std::future::Future;

use llm::LLMProvider;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::{ChatMessage, ChatProvider, StructuredOutputFormat};
use tracing::debug;

use super::error::{InsightError, InsightResult};
use super::schema::ResponseSchema;

/// Environment variable read for the API key unless configured otherwise.
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Variable checked when the configured one is unset.
const FALLBACK_API_KEY_ENV: &str = "API_KEY";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// A service that answers a prompt with text shaped by a response schema.
pub trait CompletionBackend {
    fn complete(
        &self,
        schema: ResponseSchema,
        prompt: &str,
    ) -> impl Future<Output = InsightResult<String>>;
}

/// Look up the API key, trying `primary` and then `API_KEY`.
///
/// Blank values count as missing.
pub fn resolve_api_key(
    primary: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> InsightResult<String> {
    [primary, FALLBACK_API_KEY_ENV]
        .into_iter()
        .filter_map(|name| lookup(name))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
        .ok_or_else(|| {
            InsightError::Configuration(format!(
                "no API key found; set {} (or {})",
                primary, FALLBACK_API_KEY_ENV
            ))
        })
}

/// Gemini backend built on the `llm` crate.
///
/// The response schema is fixed when an `llm` provider is built, so one
/// provider is kept per schema.
pub struct GeminiBackend {
    model: String,
    explanation: Box<dyn LLMProvider>,
    word_problem: Box<dyn LLMProvider>,
}

impl GeminiBackend {
    /// Build a backend with the key read from the environment.
    pub fn from_env(api_key_env: &str, model: &str) -> InsightResult<Self> {
        let api_key = resolve_api_key(api_key_env, |name| std::env::var(name).ok())?;
        Self::new(&api_key, model)
    }

    pub fn new(api_key: &str, model: &str) -> InsightResult<Self> {
        if api_key.trim().is_empty() {
            return Err(InsightError::Configuration("API key is empty".to_string()));
        }

        Ok(Self {
            model: model.to_string(),
            explanation: build_provider(api_key, model, ResponseSchema::Explanation)?,
            word_problem: build_provider(api_key, model, ResponseSchema::WordProblem)?,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn provider(&self, schema: ResponseSchema) -> &dyn LLMProvider {
        match schema {
            ResponseSchema::Explanation => self.explanation.as_ref(),
            ResponseSchema::WordProblem => self.word_problem.as_ref(),
        }
    }
}

fn build_provider(
    api_key: &str,
    model: &str,
    schema: ResponseSchema,
) -> InsightResult<Box<dyn LLMProvider>> {
    let format = StructuredOutputFormat {
        name: schema.name().to_string(),
        description: Some(schema.description().to_string()),
        schema: Some(schema.json_schema()),
        strict: Some(true),
    };

    LLMBuilder::new()
        .backend(LLMBackend::Google)
        .api_key(api_key)
        .model(model)
        .schema(format)
        .build()
        .map_err(|e| InsightError::Configuration(format!("failed to build Gemini client: {}", e)))
}

impl CompletionBackend for GeminiBackend {
    async fn complete(&self, schema: ResponseSchema, prompt: &str) -> InsightResult<String> {
        debug!(model = %self.model, schema = schema.name(), "Sending Gemini request");

        let messages = vec![ChatMessage::user().content(prompt).build()];
        let response = self
            .provider(schema)
            .chat(&messages)
            .await
            .map_err(|e| InsightError::Transport(e.to_string()))?;

        response
            .text()
            .ok_or_else(|| InsightError::SchemaViolation("response contained no text".to_string()))
    }
}
