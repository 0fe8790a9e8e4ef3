//! Insight requests with timeouts and schema validation.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::backend::CompletionBackend;
use super::error::{InsightError, InsightResult};
use super::insight::{AiInsight, WordProblemAnswer};
use super::prompt::{explain_prompt, word_problem_prompt};
use super::schema::{ResponseSchema, parse_response};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for calculation explanations and word problems.
///
/// Does not retry; a failed request is reported once to the caller.
pub struct InsightClient<B> {
    backend: B,
    timeout: Duration,
}

impl<B: CompletionBackend> InsightClient<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Ask for an explanation of `expression = result`.
    pub async fn explain(&self, expression: &str, result: &str) -> InsightResult<AiInsight> {
        let prompt = explain_prompt(expression, result);
        self.request(ResponseSchema::Explanation, &prompt).await
    }

    /// Ask for the answer to a word problem.
    pub async fn solve_word_problem(&self, problem: &str) -> InsightResult<WordProblemAnswer> {
        let prompt = word_problem_prompt(problem.trim());
        self.request(ResponseSchema::WordProblem, &prompt).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        schema: ResponseSchema,
        prompt: &str,
    ) -> InsightResult<T> {
        debug!(schema = schema.name(), "Requesting insight");

        let raw = tokio::time::timeout(self.timeout, self.backend.complete(schema, prompt))
            .await
            .map_err(|_| InsightError::Timeout(self.timeout))??;

        parse_response(&raw).inspect_err(|e| {
            warn!(schema = schema.name(), error = %e, "Rejected AI response");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::InsightErrorKind;
    use crate::ai::testing::{ScriptedBackend, StalledBackend};

    #[tokio::test]
    async fn test_explain_returns_validated_insight() {
        let backend = ScriptedBackend::new();
        backend.respond(
            r#"{"explanation":"Multiply before adding.","steps":["3 * 4 = 12","2 + 12 = 14"],"tips":["PEMDAS"]}"#,
        );
        let client = InsightClient::new(backend);

        let insight = client.explain("2 + 3 * 4", "14").await.unwrap();
        assert_eq!(insight.steps, vec!["3 * 4 = 12", "2 + 12 = 14"]);
        assert_eq!(insight.tips, vec!["PEMDAS"]);

        let requests = client.backend().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, ResponseSchema::Explanation);
        assert!(requests[0].1.contains("2 + 3 * 4 and got 14"));
    }

    #[tokio::test]
    async fn test_word_problem_uses_its_schema() {
        let backend = ScriptedBackend::new();
        backend.respond(r#"{"result":"5","explanation":"3 + 2","steps":["3 + 2 = 5"]}"#);
        let client = InsightClient::new(backend);

        let answer = client
            .solve_word_problem("  If I have 3 apples and buy 2 more, how many do I have?  ")
            .await
            .unwrap();
        assert_eq!(answer.result, "5");

        let requests = client.backend().requests();
        assert_eq!(requests[0].0, ResponseSchema::WordProblem);
        assert!(requests[0].1.ends_with("how many do I have?\""));
    }

    #[tokio::test]
    async fn test_missing_steps_is_schema_violation() {
        let backend = ScriptedBackend::new();
        backend.respond(r#"{"explanation":"It is 14.","tips":[]}"#);
        let client = InsightClient::new(backend);

        let err = client.explain("2 + 3 * 4", "14").await.unwrap_err();
        assert_eq!(err.kind(), InsightErrorKind::SchemaViolation);
    }

    #[tokio::test]
    async fn test_transport_failure_passes_through() {
        let backend = ScriptedBackend::new();
        backend.fail(InsightError::Transport("connection reset".to_string()));
        let client = InsightClient::new(backend);

        let err = client.solve_word_problem("2 apples").await.unwrap_err();
        assert_eq!(err, InsightError::Transport("connection reset".to_string()));
    }

    #[tokio::test]
    async fn test_timeout() {
        let client = InsightClient::new(StalledBackend).with_timeout(Duration::from_millis(20));

        let err = client.explain("1 + 1", "2").await.unwrap_err();
        assert_eq!(err.kind(), InsightErrorKind::Timeout);
        assert_eq!(err, InsightError::Timeout(Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn test_no_retry() {
        let backend = ScriptedBackend::new();
        backend.fail(InsightError::Transport("503".to_string()));
        backend.respond(r#"{"explanation":"x","steps":[],"tips":[]}"#);
        let client = InsightClient::new(backend);

        assert!(client.explain("1 + 1", "2").await.is_err());
        assert_eq!(client.backend().requests().len(), 1);
    }
}
