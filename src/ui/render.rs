//! Plain-text rendering of controller state for the terminal.

use std::fmt::Write;

use crate::ai::AiInsight;
use crate::history::{Calculation, HistoryStore};

use super::controller::Controller;

/// Render the insight panel: explanation, numbered steps and tips.
///
/// The tips section is left out when there are none.
pub fn render_insight(insight: &AiInsight) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Explanation");
    let _ = writeln!(out, "  {}", insight.explanation);

    if !insight.steps.is_empty() {
        let _ = writeln!(out, "\nSteps");
        for (i, step) in insight.steps.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, step);
        }
    }

    if !insight.tips.is_empty() {
        let _ = writeln!(out, "\nTips");
        for tip in &insight.tips {
            let _ = writeln!(out, "  - {}", tip);
        }
    }

    out
}

/// Render the history, newest first, numbered from 1.
pub fn render_history(history: &HistoryStore) -> String {
    if history.is_empty() {
        return "No calculations yet.\n".to_string();
    }

    let mut out = String::new();
    for (i, calc) in history.list().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", i + 1, calc.summary());
    }
    out
}

pub fn render_result(calc: &Calculation) -> String {
    format!("= {}", calc.result)
}

/// One status line for the insight panel, if anything is pending or failed.
pub fn render_status(controller: &Controller) -> Option<String> {
    if controller.is_loading() {
        return Some("Thinking...".to_string());
    }
    controller
        .last_error()
        .map(|message| format!("AI error: {}", message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::InsightError;
    use crate::ui::ErrorFeedback;

    #[test]
    fn test_insight_sections() {
        let insight = AiInsight {
            explanation: "Multiplication comes first.".to_string(),
            steps: vec!["3 * 4 = 12".to_string(), "2 + 12 = 14".to_string()],
            tips: vec!["Remember PEMDAS".to_string()],
        };

        let text = render_insight(&insight);
        assert!(text.starts_with("Explanation\n  Multiplication comes first.\n"));
        assert!(text.contains("  1. 3 * 4 = 12\n  2. 2 + 12 = 14\n"));
        assert!(text.contains("Tips\n  - Remember PEMDAS\n"));
    }

    #[test]
    fn test_insight_without_tips() {
        let insight = AiInsight {
            explanation: "3 + 2".to_string(),
            steps: vec!["3 + 2 = 5".to_string()],
            tips: vec![],
        };
        assert!(!render_insight(&insight).contains("Tips"));
    }

    #[test]
    fn test_history_listing() {
        let mut history = HistoryStore::new();
        assert_eq!(render_history(&history), "No calculations yet.\n");

        history.append("1 + 1", "2");
        history.append("6 * 7", "42");
        assert_eq!(render_history(&history), "  1. 6 * 7 = 42\n  2. 1 + 1 = 2\n");
    }

    #[test]
    fn test_status_lines() {
        let mut controller = Controller::new().with_error_feedback(ErrorFeedback::Surface);
        assert_eq!(render_status(&controller), None);

        let id = controller.add_calculation("1 + 1", "2").id.clone();
        let request = controller.begin_explanation(&id).unwrap();
        assert_eq!(render_status(&controller).as_deref(), Some("Thinking..."));

        controller.finish_explanation(
            request.ticket,
            Err(InsightError::Transport("offline".to_string())),
        );
        assert_eq!(
            render_status(&controller).as_deref(),
            Some("AI error: AI request failed: offline")
        );
    }
}
