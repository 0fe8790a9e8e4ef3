//! Insight payloads returned by the AI service.

use serde::{Deserialize, Serialize};

/// Explanation, ordered steps and tips for a calculation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AiInsight {
    pub explanation: String,
    pub steps: Vec<String>,
    pub tips: Vec<String>,
}

/// Answer to a word problem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WordProblemAnswer {
    pub result: String,
    pub explanation: String,
    pub steps: Vec<String>,
}

impl WordProblemAnswer {
    /// Split into the displayed result and an insight with no tips.
    pub fn into_parts(self) -> (String, AiInsight) {
        let insight = AiInsight {
            explanation: self.explanation,
            steps: self.steps,
            tips: Vec::new(),
        };
        (self.result, insight)
    }
}
