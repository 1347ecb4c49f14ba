use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

use super::base::{Completion, Provider};
use super::configs::GrokProviderConfig;
use super::utils::{
    messages_to_openai_spec, openai_response_to_completion, tools_to_openai_spec,
};
use crate::errors::{AgentError, AgentResult};
use crate::models::request::Request;

/// Adapt a canonical request to Grok's wire format, which follows the OpenAI
/// API format. No transforms beyond null exclusion and field aliasing.
pub fn to_grok(request: &Request) -> AgentResult<Value> {
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

    body.insert(
        "messages".to_string(),
        Value::Array(messages_to_openai_spec(&request.messages)),
    );

    if let Some(tools) = &request.tools {
        if !tools.is_empty() {
            body.insert(
                "tools".to_string(),
                Value::Array(tools_to_openai_spec(tools)?),
            );
        }
    }

    Ok(payload)
}

pub struct GrokProvider {
    client: Client,
    config: GrokProviderConfig,
}

impl GrokProvider {
    pub fn new(config: GrokProviderConfig) -> Result<Self> {
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
impl Provider for GrokProvider {
    async fn complete(&self, request: &Request) -> Result<Completion> {
        let payload = to_grok(request)?;
        let response = self.post(payload).await?;

        if let Some(error) = response.get("error") {
            return Err(anyhow!("Grok API error: {}", error));
        }

        openai_response_to_completion(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::Message;
    use crate::models::model::Model;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_to_grok_keeps_system_field() {
        let request = Request::builder(Model::Grok2)
            .messages(vec![Message::user("hi")])
            .system("You are terse.")
            .num_responses(2)
            .build()
            .unwrap();
        let payload = to_grok(&request).unwrap();
        // no system-message synthesis, the field passes through untouched
        assert_eq!(payload["system"], "You are terse.");
        assert_eq!(payload["messages"].as_array().unwrap().len(), 1);
        assert_eq!(payload["n"], 2);
    }

    #[test]
    fn test_to_grok_does_not_mutate_input() {
        let request = Request::builder(Model::GrokBeta)
            .messages(vec![Message::user("hi")])
            .temperature(1.0)
            .build()
            .unwrap();
        let snapshot = request.clone();
        to_grok(&request).unwrap();
        assert_eq!(request, snapshot);
    }

    #[tokio::test]
    async fn test_complete_basic() -> Result<()> {
        let response_body = json!({
            "id": "test-id",
            "object": "chat.completion",
            "model": "grok-2-1212",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "This is a test response from Grok"
                },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 10,
                "completion_tokens": 10,
                "total_tokens": 20
            }
        });

        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response_body))
            .mount(&mock_server)
            .await;

        let provider = GrokProvider::new(GrokProviderConfig {
            host: mock_server.uri(),
            api_key: "test_api_key".to_string(),
        })?;

        let request = Request::builder(Model::Grok2)
            .messages(vec![Message::user("Hello?")])
            .build()?;
        let completion = provider.complete(&request).await?;

        assert_eq!(completion.text(), "This is a test response from Grok");
        assert_eq!(completion.usage.total_tokens, Some(20));
        Ok(())
    }
}
