use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::message::Message;
use crate::models::request::Request;
use crate::models::tool::ToolCall;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// The result of a completion call, normalized back into canonical models
#[derive(Debug, Clone)]
pub struct Completion {
    pub message: Message,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Usage,
}

impl Completion {
    pub fn text(&self) -> &str {
        &self.message.content
    }
}

/// Base trait for AI providers (OpenAI, Anthropic, Grok)
///
/// Errors from `complete` are never retried by this crate; retry policy
/// belongs to the caller.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the next message for the given canonical request
    async fn complete(&self, request: &Request) -> Result<Completion>;
}
