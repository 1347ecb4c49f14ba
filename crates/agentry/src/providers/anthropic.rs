use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{Completion, Provider};
use super::configs::AnthropicProviderConfig;
use super::utils::{
    anthropic_response_to_completion, messages_to_anthropic_spec, tools_to_anthropic_spec,
};
use crate::errors::{AgentError, AgentResult};
use crate::models::request::Request;
use crate::models::role::Role;

/// Adapt a canonical request to Anthropic's messages wire format.
///
/// System messages are extracted from the history and concatenated into the
/// single `system` string (the canonical `system` field, if any, is the
/// prefix). Fields Anthropic rejects are stripped; `tool_choice` is wrapped
/// into its object form.
pub fn to_anthropic(request: &Request) -> AgentResult<Value> {
    if request.response_format.is_some() {
        return Err(AgentError::UnsupportedRequestShape(format!(
            "structured output is not supported by {}",
            request.model
        )));
    }

    let mut payload = serde_json::to_value(request)
        .map_err(|e| AgentError::Internal(e.to_string()))?;
    let body = payload
        .as_object_mut()
        .ok_or_else(|| AgentError::Internal("request did not serialize to an object".into()))?;

    body.remove("frequency_penalty");
    body.remove("presence_penalty");
    body.remove("n");

    if let Some(choice) = body.remove("tool_choice") {
        body.insert("tool_choice".to_string(), json!({"type": choice}));
    }

    let system_text: Vec<&str> = request
        .messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();
    let system = format!(
        "{}{}",
        request.system.as_deref().unwrap_or(""),
        system_text.join("\n")
    );
    body.insert("system".to_string(), json!(system));

    let messages: Vec<_> = request
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .cloned()
        .collect();
    body.insert(
        "messages".to_string(),
        Value::Array(messages_to_anthropic_spec(&messages)),
    );

    let tools = tools_to_anthropic_spec(request.tools.as_deref().unwrap_or(&[]))?;
    body.insert("tools".to_string(), Value::Array(tools));

    Ok(payload)
}

pub struct AnthropicProvider {
    client: Client,
    config: AnthropicProviderConfig,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!("{}/v1/messages", self.config.host.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            _ => {
                let error_text = response.text().await?;
                Err(anyhow!("Request failed: {}", error_text))
            }
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn complete(&self, request: &Request) -> Result<Completion> {
        let payload = to_anthropic(request)?;
        let response = self.post(payload).await?;
        anthropic_response_to_completion(&response)
    }
}
