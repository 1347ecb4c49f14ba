use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{Completion, Provider};
use super::configs::OpenAiProviderConfig;
use super::utils::{
    harden_response_schema, messages_to_openai_spec, openai_response_to_completion,
    tools_to_openai_spec,
};
use crate::errors::{AgentError, AgentResult};
use crate::models::request::Request;

/// Adapt a canonical request to OpenAI's chat completions wire format.
///
/// Pure with respect to the input: the request is never mutated. A canonical
/// `system` string becomes a synthetic leading system message; structured
/// output schemas are hardened for strict mode; reasoning models get the
/// refinements they demand (no tools, `max_completion_tokens`, no system
/// role).
pub fn to_openai(request: &Request) -> AgentResult<Value> {
    if request.response_format.is_some() && !request.model.supports_response_format() {
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

    let mut messages_spec = Vec::new();
    if let Some(system) = &request.system {
        messages_spec.push(json!({"role": "system", "content": system}));
    }
    messages_spec.extend(messages_to_openai_spec(&request.messages));
    body.remove("system");
    body.insert("messages".to_string(), Value::Array(messages_spec));

    if let Some(tools) = &request.tools {
        if !tools.is_empty() {
            body.insert(
                "tools".to_string(),
                Value::Array(tools_to_openai_spec(tools)?),
            );
        }
    }

    if let Some(format) = &request.response_format {
        let mut schema = format.schema.clone();
        harden_response_schema(&mut schema);
        let mut strict = json!({"type": "object", "additionalProperties": false});
        if let Value::Object(map) = schema {
            for (key, value) in map {
                strict[key] = value;
            }
        }
        body.insert(
            "response_format".to_string(),
            json!({
                "type": "json_schema",
                "json_schema": {
                    "name": format.name,
                    "description": "response format",
                    "strict": true,
                    "schema": strict,
                }
            }),
        );
    }

    if request.model.is_reasoning() {
        refine_for_reasoning_models(body);
    }

    Ok(payload)
}

/// Reasoning models do not accept system messages, tools, or `max_tokens`
fn refine_for_reasoning_models(body: &mut serde_json::Map<String, Value>) {
    if let Some(max_tokens) = body.remove("max_tokens") {
        body.insert("max_completion_tokens".to_string(), max_tokens);
    }
    body.remove("tools");
    if let Some(Value::Array(messages)) = body.get_mut("messages") {
        for message in messages {
            if message.get("role").and_then(|r| r.as_str()) == Some("system") {
                message["role"] = json!("user");
            }
        }
    }
}

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            _ => Err(anyhow!(
                "Request failed: {} - {}",
                response.status(),
                response.text().await?
            )),
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(&self, request: &Request) -> Result<Completion> {
        let payload = to_openai(request)?;
        let response = self.post(payload).await?;

        if let Some(error) = response.get("error") {
            return Err(anyhow!("OpenAI API error: {}", error));
        }

        openai_response_to_completion(&response)
    }
}
