use serde::Serialize;
use serde_json::Value;

use super::message::Message;
use super::model::Model;
use super::tool::Tool;
use crate::errors::{AgentError, AgentResult};

/// How the model is allowed to choose tools; absent means provider default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    None,
    Required,
    Auto,
}

/// A consumer-supplied structured-output descriptor. The core only hardens
/// the schema for strict mode, it never generates schemas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseFormat {
    pub name: String,
    pub schema: Value,
}

impl ResponseFormat {
    pub fn new<S: Into<String>>(name: S, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// A provider-agnostic completion request. Use [`Request::builder`] so the
/// numeric fields are validated against the target model before a request
/// can exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    pub model: Model,
    #[serde(skip)]
    pub messages: Vec<Message>,
    pub max_tokens: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(skip)]
    pub tools: Option<Vec<Tool>>,
    #[serde(skip)]
    pub response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(rename = "n", skip_serializing_if = "Option::is_none")]
    pub num_responses: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<i32>,
}

pub const DEFAULT_MAX_TOKENS: i32 = 4_096;

impl Request {
    pub fn builder(model: Model) -> RequestBuilder {
        RequestBuilder {
            model,
            messages: Vec::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            tool_choice: None,
            tools: None,
            response_format: None,
            system: None,
            frequency_penalty: None,
            presence_penalty: None,
            num_responses: None,
            top_p: None,
        }
    }
}

pub struct RequestBuilder {
    model: Model,
    messages: Vec<Message>,
    max_tokens: i32,
    temperature: Option<f32>,
    tool_choice: Option<ToolChoice>,
    tools: Option<Vec<Tool>>,
    response_format: Option<ResponseFormat>,
    system: Option<String>,
    frequency_penalty: Option<f32>,
    presence_penalty: Option<f32>,
    num_responses: Option<i32>,
    top_p: Option<i32>,
}

impl RequestBuilder {
    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn max_tokens(mut self, max_tokens: i32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    pub fn tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn response_format(mut self, response_format: ResponseFormat) -> Self {
        self.response_format = Some(response_format);
        self
    }

    pub fn system<S: Into<String>>(mut self, system: S) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    pub fn presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    pub fn num_responses(mut self, num_responses: i32) -> Self {
        self.num_responses = Some(num_responses);
        self
    }

    pub fn top_p(mut self, top_p: i32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn build(self) -> AgentResult<Request> {
        let ceiling = self.model.max_tokens_ceiling();
        if self.max_tokens <= 0 || self.max_tokens > ceiling {
            return Err(AgentError::ValidationFailure(format!(
                "max_tokens must be in 1..={} for {}, got {}",
                ceiling, self.model, self.max_tokens
            )));
        }
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(AgentError::ValidationFailure(format!(
                    "temperature must be in [0, 2], got {}",
                    temperature
                )));
            }
        }
        for (name, penalty) in [
            ("frequency_penalty", self.frequency_penalty),
            ("presence_penalty", self.presence_penalty),
        ] {
            if let Some(penalty) = penalty {
                if !(-2.0..=2.0).contains(&penalty) {
                    return Err(AgentError::ValidationFailure(format!(
                        "{} must be in [-2, 2], got {}",
                        name, penalty
                    )));
                }
            }
        }
        Ok(Request {
            model: self.model,
            messages: self.messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            tool_choice: self.tool_choice,
            tools: self.tools,
            response_format: self.response_format,
            system: self.system,
            frequency_penalty: self.frequency_penalty,
            presence_penalty: self.presence_penalty,
            num_responses: self.num_responses,
            top_p: self.top_p,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = Request::builder(Model::Gpt4o)
            .messages(vec![Message::user("hi")])
            .build()
            .unwrap();
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(request.temperature.is_none());
        assert!(request.tools.is_none());
    }

    #[test]
    fn test_max_tokens_ceiling_is_per_provider() {
        // 100k fits openai's ceiling but not anthropic's
        assert!(Request::builder(Model::Gpt4o)
            .max_tokens(100_000)
            .build()
            .is_ok());
        let err = Request::builder(Model::Claude35Sonnet)
            .max_tokens(100_000)
            .build()
            .unwrap_err();
        assert!(matches!(err, AgentError::ValidationFailure(_)));
    }

    #[test]
    fn test_max_tokens_must_be_positive() {
        let err = Request::builder(Model::Gpt4o)
            .max_tokens(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, AgentError::ValidationFailure(_)));
    }

    #[test]
    fn test_temperature_range() {
        assert!(Request::builder(Model::Gpt4o)
            .temperature(2.0)
            .build()
            .is_ok());
        assert!(Request::builder(Model::Gpt4o)
            .temperature(2.1)
            .build()
            .is_err());
    }

    #[test]
    fn test_penalty_range() {
        assert!(Request::builder(Model::Gpt4o)
            .frequency_penalty(-2.0)
            .presence_penalty(2.0)
            .build()
            .is_ok());
        assert!(Request::builder(Model::Gpt4o)
            .presence_penalty(2.5)
            .build()
            .is_err());
    }

    #[test]
    fn test_num_responses_alias() {
        let request = Request::builder(Model::Gpt4o)
            .num_responses(3)
            .build()
            .unwrap();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["n"], 3);
        assert!(value.get("num_responses").is_none());
        // null-valued optionals are excluded from the dump
        assert!(value.get("temperature").is_none());
    }
}
