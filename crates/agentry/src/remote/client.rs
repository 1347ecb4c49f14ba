use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{AgentError, AgentResult};
use crate::models::tool::Tool;

/// One connection to a remote tool-providing endpoint
#[async_trait]
pub trait ToolServerClient: Send + Sync {
    /// The endpoint URL this client talks to
    fn endpoint(&self) -> &str;

    /// Perform the session handshake
    async fn create_session(&self) -> AgentResult<()>;

    /// List the tools the endpoint exposes
    async fn list_tools(&self) -> AgentResult<Vec<Tool>>;

    /// Invoke a remote tool by name
    async fn call_tool(&self, name: &str, arguments: Value) -> AgentResult<String>;

    /// Close the connection and release the session
    async fn close(&self) -> AgentResult<()>;
}

/// Produces clients for endpoint URLs. The supervisor goes through this seam
/// so tests can substitute in-memory servers.
#[async_trait]
pub trait ServerConnector: Send + Sync {
    async fn connect(&self, url: &str) -> AgentResult<Arc<dyn ToolServerClient>>;
}

/// JSON-over-HTTP client for MCP-style tool servers
pub struct HttpToolClient {
    client: Client,
    endpoint: String,
}

impl HttpToolClient {
    pub fn new(endpoint: &str) -> AgentResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AgentError::ConnectionFailure(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    async fn post(&self, method: &str, params: Value) -> AgentResult<Value> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AgentError::ConnectionFailure(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AgentError::ConnectionFailure(format!(
                "{} returned {} for {}",
                self.endpoint,
                response.status(),
                method
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AgentError::ConnectionFailure(e.to_string()))?;

        if let Some(error) = body.get("error") {
            return Err(AgentError::ConnectionFailure(format!(
                "{} error for {}: {}",
                self.endpoint, method, error
            )));
        }

        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }
}

#[async_trait]
impl ToolServerClient for HttpToolClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn create_session(&self) -> AgentResult<()> {
        self.post("initialize", json!({})).await?;
        Ok(())
    }

    async fn list_tools(&self) -> AgentResult<Vec<Tool>> {
        let result = self.post("tools/list", json!({})).await?;
        let tools = result
            .get("tools")
            .and_then(|t| t.as_array())
            .ok_or_else(|| {
                AgentError::ConnectionFailure(format!(
                    "{} returned no tool list",
                    self.endpoint
                ))
            })?;

        Ok(tools
            .iter()
            .map(|tool| {
                Tool::new(
                    tool["name"].as_str().unwrap_or_default(),
                    tool["description"].as_str().unwrap_or_default(),
                    tool.get("inputSchema")
                        .cloned()
                        .unwrap_or_else(|| json!({"type": "object"})),
                )
            })
            .collect())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> AgentResult<String> {
        let result = self
            .post("tools/call", json!({"name": name, "arguments": arguments}))
            .await
            .map_err(|e| AgentError::ExecutionError(e.to_string()))?;

        Ok(result
            .get("content")
            .and_then(|c| c.as_str())
            .unwrap_or_default()
            .to_string())
    }

    async fn close(&self) -> AgentResult<()> {
        self.post("close", json!({})).await?;
        Ok(())
    }
}

/// Default connector producing [`HttpToolClient`]s
#[derive(Default)]
pub struct HttpConnector;

#[async_trait]
impl ServerConnector for HttpConnector {
    async fn connect(&self, url: &str) -> AgentResult<Arc<dyn ToolServerClient>> {
        Ok(Arc::new(HttpToolClient::new(url)?))
    }
}
