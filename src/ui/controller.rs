//! Application state and the actions the presentation layer can take.
//!
//! The controller owns the keypad, the history and the insight panel state.
//! Insight requests are split into a `begin_*` step that hands out a
//! [`Ticket`] and a `finish_*` step that applies the outcome only if the
//! ticket is still current. Starting a new request or calling [`reset`]
//! makes every earlier ticket stale.
//!
//! [`reset`]: Controller::reset

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ai::{
    AiInsight, CompletionBackend, InsightClient, InsightError, InsightResult, WordProblemAnswer,
};
use crate::calculator::{EvalError, Key, KeyOutcome, Keypad};
use crate::history::{Calculation, HistoryStore};

/// What to show when an insight request fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorFeedback {
    /// Log the failure and show nothing.
    #[default]
    Silent,
    /// Keep the failure message in [`Controller::last_error`].
    Surface,
}

/// Identity of an insight request, compared when its result arrives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

/// An explanation request ready to be sent.
#[derive(Clone, Debug)]
pub struct ExplainRequest {
    pub ticket: Ticket,
    pub calculation_id: String,
    pub expression: String,
    pub result: String,
}

/// A word problem request ready to be sent.
#[derive(Clone, Debug)]
pub struct WordProblemRequest {
    pub ticket: Ticket,
    pub problem: String,
}

#[derive(Debug, Default)]
pub struct Controller {
    keypad: Keypad,
    history: HistoryStore,
    active_insight: Option<AiInsight>,
    is_loading: bool,
    last_error: Option<String>,
    generation: u64,
    error_feedback: ErrorFeedback,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, history: HistoryStore) -> Self {
        self.history = history;
        self
    }

    pub fn with_error_feedback(mut self, error_feedback: ErrorFeedback) -> Self {
        self.error_feedback = error_feedback;
        self
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn active_insight(&self) -> Option<&AiInsight> {
        self.active_insight.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Message of the last failed request, when errors are surfaced.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// What the calculator display currently shows.
    pub fn display(&self) -> &str {
        self.keypad.display()
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    // --- Calculator ---

    /// Record a calculation directly.
    pub fn add_calculation(
        &mut self,
        expression: impl Into<String>,
        result: impl Into<String>,
    ) -> &Calculation {
        self.history.append(expression, result)
    }

    /// Press a keypad key. A successful `=` is recorded in the history.
    pub fn press(&mut self, key: Key) -> KeyOutcome {
        let outcome = self.keypad.press(key);

        match &outcome {
            KeyOutcome::Calculated { expression, result } => {
                self.history.append(expression.clone(), result.clone());
            }
            KeyOutcome::Failed(err) => {
                debug!(error = %err, "Evaluation failed");
            }
            KeyOutcome::Updated => {}
        }

        outcome
    }

    /// Type `text` on the keypad, ignoring whitespace.
    ///
    /// Nothing is pressed if any character has no key.
    pub fn enter(&mut self, text: &str) -> Result<(), EvalError> {
        let keys = text
            .char_indices()
            .filter(|(_, c)| !c.is_whitespace())
            .map(|(position, c)| {
                Key::from_char(c).ok_or_else(|| EvalError::Syntax {
                    position,
                    reason: format!("unexpected character '{}'", c),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for key in keys {
            self.press(key);
        }
        Ok(())
    }

    /// Press `=`. Returns the new history entry, or `None` when the shown
    /// result was already recorded.
    pub fn calculate(&mut self) -> Result<Option<&Calculation>, EvalError> {
        match self.press(Key::Equals) {
            KeyOutcome::Calculated { .. } => Ok(self.history.latest()),
            KeyOutcome::Failed(err) => Err(err),
            KeyOutcome::Updated => Ok(None),
        }
    }

    // --- Insight requests ---

    /// Start explaining the history entry `id`.
    pub fn begin_explanation(&mut self, id: &str) -> Option<ExplainRequest> {
        let calculation = self.history.get(id)?;
        let calculation_id = calculation.id.clone();
        let expression = calculation.expression.clone();
        let result = calculation.result.clone();

        let ticket = self.start_request();
        debug!(?ticket, id = %calculation_id, "Explanation requested");

        Some(ExplainRequest {
            ticket,
            calculation_id,
            expression,
            result,
        })
    }

    /// Apply the outcome of an explanation request.
    ///
    /// Returns `false` when the request was superseded and the outcome was
    /// discarded.
    pub fn finish_explanation(
        &mut self,
        ticket: Ticket,
        outcome: InsightResult<AiInsight>,
    ) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.is_loading = false;

        match outcome {
            Ok(insight) => {
                info!(steps = insight.steps.len(), "Explanation received");
                self.active_insight = Some(insight);
            }
            Err(err) => self.record_failure(err),
        }
        true
    }

    /// Start answering a word problem. Blank text starts nothing.
    pub fn begin_word_problem(&mut self, problem: &str) -> Option<WordProblemRequest> {
        let problem = problem.trim();
        if problem.is_empty() {
            return None;
        }

        let ticket = self.start_request();
        debug!(?ticket, "Word problem submitted");

        Some(WordProblemRequest {
            ticket,
            problem: problem.to_string(),
        })
    }

    /// Apply the outcome of a word problem request. A current answer is
    /// recorded in the history and shown with an empty tips list.
    pub fn finish_word_problem(
        &mut self,
        request: WordProblemRequest,
        outcome: InsightResult<WordProblemAnswer>,
    ) -> bool {
        if !self.accepts(request.ticket) {
            return false;
        }
        self.is_loading = false;

        match outcome {
            Ok(answer) => {
                let (result, insight) = answer.into_parts();
                info!(result = %result, "Word problem answered");
                self.history.append(request.problem, result);
                self.active_insight = Some(insight);
            }
            Err(err) => self.record_failure(err),
        }
        true
    }

    /// Drop the insight panel state and invalidate in-flight requests.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.active_insight = None;
        self.is_loading = false;
        self.last_error = None;
    }

    /// Explain a history entry and wait for the answer.
    pub async fn get_ai_explanation<B: CompletionBackend>(
        &mut self,
        client: &InsightClient<B>,
        id: &str,
    ) -> bool {
        let Some(request) = self.begin_explanation(id) else {
            return false;
        };
        let outcome = client.explain(&request.expression, &request.result).await;
        self.finish_explanation(request.ticket, outcome)
    }

    /// Submit a word problem and wait for the answer.
    pub async fn handle_word_problem<B: CompletionBackend>(
        &mut self,
        client: &InsightClient<B>,
        problem: &str,
    ) -> bool {
        let Some(request) = self.begin_word_problem(problem) else {
            return false;
        };
        let outcome = client.solve_word_problem(&request.problem).await;
        self.finish_word_problem(request, outcome)
    }

    fn start_request(&mut self) -> Ticket {
        self.generation += 1;
        self.active_insight = None;
        self.last_error = None;
        self.is_loading = true;
        Ticket(self.generation)
    }

    fn accepts(&self, ticket: Ticket) -> bool {
        if ticket.0 != self.generation || !self.is_loading {
            debug!(?ticket, current = self.generation, "Discarding stale insight result");
            return false;
        }
        true
    }

    fn record_failure(&mut self, err: InsightError) {
        warn!(error = %err, kind = ?err.kind(), "Insight request failed");
        if self.error_feedback == ErrorFeedback::Surface {
            self.last_error = Some(err.to_string());
        }
    }
}
