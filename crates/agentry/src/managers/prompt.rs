use async_trait::async_trait;
use indoc::formatdoc;
use tracing::warn;

use super::PromptManager;
use crate::errors::AgentResult;
use crate::models::message::Message;
use crate::models::model::Model;
use crate::models::request::Request;
use crate::providers::base::Provider;

/// Responses shorter than this are treated as degenerate and discarded
const MIN_PROMPT_LEN: usize = 10;

/// Default prompt manager that returns the current prompt unchanged
#[derive(Default)]
pub struct NoOpPromptManager;

#[async_trait]
impl PromptManager for NoOpPromptManager {
    async fn update_prompt(
        &mut self,
        _message: &Message,
        current_prompt: &str,
    ) -> AgentResult<String> {
        Ok(current_prompt.to_string())
    }
}

/// Revises the system prompt per message via an auxiliary inference call.
/// Malformed or degenerate output always falls back to the current prompt;
/// no retry is attempted.
pub struct AdaptivePromptManager {
    provider: Box<dyn Provider>,
    model: Model,
    temperature: f32,
    max_tokens: i32,
}

impl AdaptivePromptManager {
    pub fn new(provider: Box<dyn Provider>, model: Model) -> Self {
        Self {
            provider,
            model,
            temperature: 0.1,
            max_tokens: 300,
        }
    }

    fn adjustment_prompt(current_prompt: &str, message: &Message) -> String {
        formatdoc! {r#"
            You are an AI system that adjusts the system prompt for another assistant.

            Current system prompt:
            "{current_prompt}"

            Latest user message:
            "{content}"

            Your task: Determine if the system prompt needs adjustment to better address the user's message.

            Rules:
            1. If no changes are needed, respond with the EXACT original prompt.
            2. If changes are needed, create an improved prompt that helps the assistant better address the user's needs.
            3. Changes should be minimal but effective.
            4. The prompt should be complete and ready to use.

            Respond with ONLY the new system prompt, no explanation:
        "#,
            content = message.content,
        }
    }
}

#[async_trait]
impl PromptManager for AdaptivePromptManager {
    async fn update_prompt(
        &mut self,
        message: &Message,
        current_prompt: &str,
    ) -> AgentResult<String> {
        let request = Request::builder(self.model)
            .messages(vec![Message::system(Self::adjustment_prompt(
                current_prompt,
                message,
            ))])
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()?;

        let completion = match self.provider.complete(&request).await {
            Ok(completion) => completion,
            Err(e) => {
                warn!(error = %e, "prompt adjustment call failed, keeping current prompt");
                return Ok(current_prompt.to_string());
            }
        };

        let new_prompt = completion.text().trim();
        if new_prompt.len() < MIN_PROMPT_LEN {
            return Ok(current_prompt.to_string());
        }

        Ok(new_prompt.to_string())
    }
}
