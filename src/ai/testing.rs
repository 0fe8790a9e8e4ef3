//! Fake backends for tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use super::backend::CompletionBackend;
use super::error::{InsightError, InsightResult};
use super::schema::ResponseSchema;

/// Replays queued responses in order and records every request.
#[derive(Default)]
pub struct ScriptedBackend {
    responses: RefCell<VecDeque<InsightResult<String>>>,
    requests: RefCell<Vec<(ResponseSchema, String)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, raw: &str) {
        self.responses.borrow_mut().push_back(Ok(raw.to_string()));
    }

    pub fn fail(&self, err: InsightError) {
        self.responses.borrow_mut().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<(ResponseSchema, String)> {
        self.requests.borrow().clone()
    }
}

impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, schema: ResponseSchema, prompt: &str) -> InsightResult<String> {
        self.requests
            .borrow_mut()
            .push((schema, prompt.to_string()));
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(InsightError::Transport("no scripted response".to_string())))
    }
}

/// Never answers.
pub struct StalledBackend;

impl CompletionBackend for StalledBackend {
    async fn complete(&self, _schema: ResponseSchema, _prompt: &str) -> InsightResult<String> {
        std::future::pending().await
    }
}
