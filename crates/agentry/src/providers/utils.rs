use anyhow::{anyhow, Result};
use regex::Regex;
use serde_json::{json, Value};

use super::base::{Completion, Usage};
use crate::errors::{AgentError, AgentResult};
use crate::models::message::Message;
use crate::models::role::Role;
use crate::models::tool::{Tool, ToolCall};

/// Convert canonical messages to OpenAI's API message specification. Grok
/// uses the same shape.
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut converted = json!({
            "role": message.role,
            "content": message.content,
        });

        if let Some(tool_call_id) = &message.tool_call_id {
            converted["tool_call_id"] = json!(tool_call_id);
        }

        if let Some(tool_calls) = &message.tool_calls {
            let calls: Vec<Value> = tool_calls
                .iter()
                .map(|call| {
                    json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": sanitize_function_name(&call.name),
                            "arguments": call.arguments.to_string(),
                        }
                    })
                })
                .collect();
            converted["tool_calls"] = Value::Array(calls);
        }

        messages_spec.push(converted);
    }

    messages_spec
}

/// Convert canonical messages to Anthropic's API message specification.
/// System messages must already be extracted by the adapter.
pub fn messages_to_anthropic_spec(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| {
            json!({
                "role": message.role,
                "content": message.content,
            })
        })
        .collect()
}

/// Convert canonical tools to OpenAI's API tool specification
pub fn tools_to_openai_spec(tools: &[Tool]) -> AgentResult<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(AgentError::DuplicateTool(tool.name.clone()));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters,
            }
        }));
    }

    Ok(result)
}

/// Convert canonical tools to Anthropic's API tool specification
pub fn tools_to_anthropic_spec(tools: &[Tool]) -> AgentResult<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(AgentError::DuplicateTool(tool.name.clone()));
        }

        result.push(json!({
            "name": tool.name,
            "description": tool.description,
            "input_schema": tool.parameters,
        }));
    }

    Ok(result)
}

/// Recursively inject `additionalProperties: false` into every object-typed
/// node of a JSON schema, including nodes nested inside arrays. Required for
/// OpenAI strict structured output.
pub fn harden_response_schema(schema: &mut Value) {
    match schema {
        Value::Object(map) => {
            if map.get("type").and_then(|t| t.as_str()) == Some("object") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
            }
            for value in map.values_mut() {
                harden_response_schema(value);
            }
        }
        Value::Array(items) => {
            for item in items {
                harden_response_schema(item);
            }
        }
        _ => {}
    }
}

pub fn sanitize_function_name(name: &str) -> String {
    let re = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
    re.replace_all(name, "_").to_string()
}

pub fn is_valid_function_name(name: &str) -> bool {
    let re = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
    re.is_match(name)
}

/// Convert an OpenAI-style chat completion response to a [`Completion`]
pub fn openai_response_to_completion(response: &Value) -> Result<Completion> {
    let original = response
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| anyhow!("No message in response"))?;

    let content = original
        .get("content")
        .and_then(|c| c.as_str())
        .unwrap_or_default();

    let mut tool_calls = Vec::new();
    if let Some(calls) = original.get("tool_calls").and_then(|c| c.as_array()) {
        for call in calls {
            let id = call["id"].as_str().unwrap_or_default().to_string();
            let name = call["function"]["name"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            if !is_valid_function_name(&name) {
                return Err(anyhow!(
                    "The function name '{}' had invalid characters, it must match [a-zA-Z0-9_-]+",
                    name
                ));
            }
            let arguments = call["function"]["arguments"].as_str().unwrap_or_default();
            let arguments: Value = serde_json::from_str(arguments)
                .map_err(|e| anyhow!("Could not interpret tool arguments for id {}: {}", id, e))?;
            tool_calls.push(ToolCall::new(id, name, arguments));
        }
    }

    let mut message = Message::assistant(content);
    if !tool_calls.is_empty() {
        message = message.with_tool_calls(tool_calls.clone());
    }

    Ok(Completion {
        message,
        tool_calls,
        usage: openai_usage(response),
    })
}

fn openai_usage(response: &Value) -> Usage {
    let usage = match response.get("usage") {
        Some(usage) => usage,
        None => return Usage::default(),
    };
    let input_tokens = usage
        .get("prompt_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);
    let output_tokens = usage
        .get("completion_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);
    let total_tokens = usage
        .get("total_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32)
        .or_else(|| match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        });
    Usage::new(input_tokens, output_tokens, total_tokens)
}

/// Convert an Anthropic messages response to a [`Completion`]
pub fn anthropic_response_to_completion(response: &Value) -> Result<Completion> {
    let blocks = response
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| anyhow!("Invalid response format from Anthropic API"))?;

    let mut texts = Vec::new();
    let mut tool_calls = Vec::new();
    for block in blocks {
        match block.get("type").and_then(|t| t.as_str()) {
            Some("text") => {
                if let Some(text) = block.get("text").and_then(|t| t.as_str()) {
                    texts.push(text.to_string());
                }
            }
            Some("tool_use") => {
                tool_calls.push(ToolCall::new(
                    block["id"].as_str().unwrap_or_default(),
                    block["name"].as_str().unwrap_or_default(),
                    block.get("input").cloned().unwrap_or(Value::Null),
                ));
            }
            _ => {}
        }
    }

    let usage = response.get("usage").map_or_else(Usage::default, |usage| {
        let input = usage
            .get("input_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);
        let output = usage
            .get("output_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);
        let total = match (input, output) {
            (Some(i), Some(o)) => Some(i + o),
            _ => None,
        };
        Usage::new(input, output, total)
    });

    let mut message = Message::assistant(texts.join("\n"));
    if !tool_calls.is_empty() {
        message = message.with_tool_calls(tool_calls.clone());
    }

    Ok(Completion {
        message,
        tool_calls,
        usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPENAI_TOOL_USE_RESPONSE: &str = r#"{
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {
                        "name": "example_fn",
                        "arguments": "{\"param\": \"value\"}"
                    }
                }]
            }
        }],
        "usage": {
            "prompt_tokens": 10,
            "completion_tokens": 25,
            "total_tokens": 35
        }
    }"#;

    #[test]
    fn test_messages_to_openai_spec() {
        let messages = vec![
            Message::user("How are you?"),
            Message::tool("ok", "call_1"),
        ];
        let spec = messages_to_openai_spec(&messages);
        assert_eq!(spec.len(), 2);
        assert_eq!(spec[0]["role"], "user");
        assert_eq!(spec[0]["content"], "How are you?");
        assert_eq!(spec[1]["role"], "tool");
        assert_eq!(spec[1]["tool_call_id"], "call_1");
    }

    #[test]
    fn test_assistant_tool_calls_spec() {
        let message = Message::assistant("").with_tool_calls(vec![ToolCall::new(
            "call_1",
            "get weather",
            json!({"location": "SF"}),
        )]);
        let spec = messages_to_openai_spec(&[message]);
        // invalid characters in the function name are sanitized on the way out
        assert_eq!(spec[0]["tool_calls"][0]["function"]["name"], "get_weather");
        assert_eq!(
            spec[0]["tool_calls"][0]["function"]["arguments"],
            "{\"location\":\"SF\"}"
        );
    }

    #[test]
    fn test_tools_to_openai_spec_duplicate() {
        let tool1 = Tool::new("test_tool", "Test tool", json!({"type": "object"}));
        let tool2 = Tool::new("test_tool", "Test tool", json!({"type": "object"}));
        let result = tools_to_openai_spec(&[tool1, tool2]);
        assert!(matches!(result, Err(AgentError::DuplicateTool(_))));
    }

    #[test]
    fn test_tools_to_anthropic_spec() {
        let tool = Tool::new("lookup", "Look something up", json!({"type": "object"}));
        let spec = tools_to_anthropic_spec(&[tool]).unwrap();
        assert_eq!(spec[0]["name"], "lookup");
        assert_eq!(spec[0]["input_schema"], json!({"type": "object"}));
        assert!(spec[0].get("parameters").is_none());
    }

    #[test]
    fn test_harden_response_schema_nested() {
        let mut schema = json!({
            "type": "object",
            "properties": {
                "items": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "inner": {
                                "type": "object",
                                "properties": {"leaf": {"type": "string"}}
                            }
                        }
                    }
                }
            }
        });
        harden_response_schema(&mut schema);
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(
            schema["properties"]["items"]["items"]["additionalProperties"],
            false
        );
        assert_eq!(
            schema["properties"]["items"]["items"]["properties"]["inner"]
                ["additionalProperties"],
            false
        );
        // non-object nodes are left alone
        assert!(schema["properties"]["items"]
            .get("additionalProperties")
            .is_none());
    }

    #[test]
    fn test_sanitize_function_name() {
        assert_eq!(sanitize_function_name("hello-world"), "hello-world");
        assert_eq!(sanitize_function_name("hello world"), "hello_world");
        assert_eq!(sanitize_function_name("hello@world"), "hello_world");
    }

    #[test]
    fn test_openai_response_to_completion_text() -> Result<()> {
        let response = json!({
            "choices": [{"message": {"role": "assistant", "content": "Hello!"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 25}
        });
        let completion = openai_response_to_completion(&response)?;
        assert_eq!(completion.text(), "Hello!");
        assert!(completion.tool_calls.is_empty());
        assert_eq!(completion.usage.total_tokens, Some(35));
        Ok(())
    }

    #[test]
    fn test_openai_response_to_completion_tool_calls() -> Result<()> {
        let response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        let completion = openai_response_to_completion(&response)?;
        assert_eq!(completion.tool_calls.len(), 1);
        assert_eq!(completion.tool_calls[0].name, "example_fn");
        assert_eq!(completion.tool_calls[0].arguments, json!({"param": "value"}));
        Ok(())
    }

    #[test]
    fn test_openai_response_invalid_function_name() {
        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE).unwrap();
        response["choices"][0]["message"]["tool_calls"][0]["function"]["name"] =
            json!("invalid fn");
        assert!(openai_response_to_completion(&response).is_err());
    }

    #[test]
    fn test_anthropic_response_to_completion() -> Result<()> {
        let response = json!({
            "content": [
                {"type": "text", "text": "Checking the weather."},
                {"type": "tool_use", "id": "toolu_1", "name": "get_weather", "input": {"city": "SF"}}
            ],
            "usage": {"input_tokens": 12, "output_tokens": 15}
        });
        let completion = anthropic_response_to_completion(&response)?;
        assert_eq!(completion.text(), "Checking the weather.");
        assert_eq!(completion.tool_calls[0].name, "get_weather");
        assert_eq!(completion.usage.total_tokens, Some(27));
        Ok(())
    }
}
