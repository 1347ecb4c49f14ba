use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use super::base::{Completion, Provider, Usage};
use crate::models::message::Message;
use crate::models::request::Request;

/// A mock provider that returns pre-configured responses for testing.
/// Clones share the same response queue and request log.
#[derive(Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Completion>>>,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of text responses
    pub fn new(responses: Vec<Message>) -> Self {
        let completions = responses
            .into_iter()
            .map(|message| Completion {
                tool_calls: message.tool_calls.clone().unwrap_or_default(),
                message,
                usage: Usage::default(),
            })
            .collect();
        Self {
            responses: Arc::new(Mutex::new(completions)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The requests this provider has seen, in order
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: &Request) -> Result<Completion> {
        self.requests.lock().unwrap().push(request.clone());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Return empty response if no more pre-configured responses
            Ok(Completion {
                message: Message::assistant(""),
                tool_calls: vec![],
                usage: Usage::default(),
            })
        } else {
            Ok(responses.remove(0))
        }
    }
}
