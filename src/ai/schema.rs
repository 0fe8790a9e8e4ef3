//! Response schemas requested from the AI service and the validation gate
//! applied to what comes back.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::error::{InsightError, InsightResult};

/// The structured response shape a request asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResponseSchema {
    /// `{ explanation, steps[], tips[] }`
    Explanation,
    /// `{ result, explanation, steps[] }`
    WordProblem,
}

impl ResponseSchema {
    pub fn name(self) -> &'static str {
        match self {
            Self::Explanation => "calculation_insight",
            Self::WordProblem => "word_problem_answer",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Explanation => "Step-by-step explanation of a calculation with related tips.",
            Self::WordProblem => "Numeric answer to a word problem with its explanation.",
        }
    }

    /// JSON schema sent alongside the prompt.
    pub fn json_schema(self) -> Value {
        match self {
            Self::Explanation => json!({
                "type": "object",
                "properties": {
                    "explanation": {
                        "type": "string",
                        "description": "A high-level summary of the mathematical concept."
                    },
                    "steps": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Sequential steps to solve or understand the expression."
                    },
                    "tips": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Related mathematical tips or shortcuts."
                    }
                },
                "required": ["explanation", "steps", "tips"]
            }),
            Self::WordProblem => json!({
                "type": "object",
                "properties": {
                    "result": { "type": "string" },
                    "explanation": { "type": "string" },
                    "steps": {
                        "type": "array",
                        "items": { "type": "string" }
                    }
                },
                "required": ["result", "explanation", "steps"]
            }),
        }
    }
}

/// Validate raw response text against the payload type `T`.
///
/// The text must be a single JSON object with exactly the declared fields
/// of the declared types.
pub fn parse_response<T: DeserializeOwned>(raw: &str) -> InsightResult<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InsightError::SchemaViolation("empty response".to_string()));
    }

    serde_json::from_str(trimmed).map_err(|e| InsightError::SchemaViolation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiInsight, InsightErrorKind, WordProblemAnswer};

    fn violation<T: DeserializeOwned + std::fmt::Debug>(raw: &str) -> String {
        match parse_response::<T>(raw) {
            Err(InsightError::SchemaViolation(msg)) => msg,
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_explanation() {
        let insight: AiInsight = parse_response(
            r#"{"explanation":"Multiplication first.","steps":["3*4=12","2+12=14"],"tips":[]}"#,
        )
        .unwrap();
        assert_eq!(insight.steps.len(), 2);
        assert!(insight.tips.is_empty());
    }

    #[test]
    fn test_surrounding_whitespace_allowed() {
        let answer: WordProblemAnswer =
            parse_response("\n  {\"result\":\"5\",\"explanation\":\"3+2\",\"steps\":[\"3+2=5\"]}\n")
                .unwrap();
        assert_eq!(answer.result, "5");
    }

    #[test]
    fn test_missing_field() {
        let msg = violation::<AiInsight>(r#"{"explanation":"x","tips":[]}"#);
        assert!(msg.contains("steps"), "{}", msg);
    }

    #[test]
    fn test_mistyped_field() {
        violation::<AiInsight>(r#"{"explanation":"x","steps":"one, two","tips":[]}"#);
        violation::<AiInsight>(r#"{"explanation":"x","steps":[1, 2],"tips":[]}"#);
        violation::<WordProblemAnswer>(r#"{"result":5,"explanation":"x","steps":[]}"#);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let msg = violation::<WordProblemAnswer>(
            r#"{"result":"5","explanation":"x","steps":[],"confidence":"high"}"#,
        );
        assert!(msg.contains("confidence"), "{}", msg);
    }

    #[test]
    fn test_not_json() {
        violation::<AiInsight>("The answer is 14 because multiplication comes first.");
        violation::<AiInsight>(r#"["explanation"]"#);
        assert_eq!(violation::<AiInsight>("   "), "empty response");
    }

    #[test]
    fn test_schema_kind() {
        let err = parse_response::<AiInsight>("{}").unwrap_err();
        assert_eq!(err.kind(), InsightErrorKind::SchemaViolation);
    }

    #[test]
    fn test_declared_schemas_require_all_fields() {
        let explanation = ResponseSchema::Explanation.json_schema();
        assert_eq!(explanation["required"], json!(["explanation", "steps", "tips"]));

        let word = ResponseSchema::WordProblem.json_schema();
        assert_eq!(word["required"], json!(["result", "explanation", "steps"]));
        assert_eq!(word["properties"]["steps"]["items"]["type"], "string");
    }
}
