//! In-memory chat backend for tests

use std::sync::Mutex;

use async_trait::async_trait;

use super::client::{ChatBackend, ChatRequest, Role};
use crate::error::PipelineResult;

type Responder = Box<dyn Fn(&ChatRequest) -> PipelineResult<String> + Send + Sync>;

/// Answers every request through a closure and records what it was sent
pub struct ScriptedBackend {
    responder: Responder,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedBackend {
    pub fn new(
        responder: impl Fn(&ChatRequest) -> PipelineResult<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `text`
    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(text.clone()))
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn chat(&self, request: &ChatRequest) -> PipelineResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(request)
    }
}

/// Text of the user turn of a request
pub fn user_turn(request: &ChatRequest) -> &str {
    request
        .messages
        .iter()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or_default()
}
