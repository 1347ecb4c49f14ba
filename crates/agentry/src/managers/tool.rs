use async_trait::async_trait;
use indoc::formatdoc;
use std::collections::HashSet;
use tracing::{debug, warn};

use super::ToolManager;
use crate::errors::{AgentError, AgentResult};
use crate::models::message::Message;
use crate::models::model::Model;
use crate::models::request::Request;
use crate::models::tool::Tool;
use crate::providers::base::Provider;
use crate::remote::supervisor::ToolConnectionSupervisor;

/// Default tool manager that returns the current tools unchanged
#[derive(Default)]
pub struct NoOpToolManager;

#[async_trait]
impl ToolManager for NoOpToolManager {
    async fn update_tools(
        &mut self,
        _message: &Message,
        current_tools: Vec<Tool>,
    ) -> AgentResult<Vec<Tool>> {
        Ok(current_tools)
    }
}

/// Selects which remote tool servers to connect for each message by asking an
/// auxiliary model, then reconciles live connections to match.
///
/// Outsourcing the selection keeps the active toolbox within a single
/// request's practical tool-count budget no matter how many capability
/// servers are configured.
pub struct AdaptiveToolManager {
    provider: Box<dyn Provider>,
    model: Model,
    temperature: f32,
    max_tokens: i32,
    /// When the selection response is malformed or selects nothing valid,
    /// connect every known server instead of leaving tools unchanged
    default_connect_all: bool,
    supervisor: ToolConnectionSupervisor,
}

impl AdaptiveToolManager {
    pub fn new(provider: Box<dyn Provider>, model: Model, supervisor: ToolConnectionSupervisor) -> Self {
        Self {
            provider,
            model,
            temperature: 0.1,
            max_tokens: 100,
            default_connect_all: false,
            supervisor,
        }
    }

    pub fn with_default_connect_all(mut self, default_connect_all: bool) -> Self {
        self.default_connect_all = default_connect_all;
        self
    }

    pub fn supervisor(&self) -> &ToolConnectionSupervisor {
        &self.supervisor
    }

    fn selection_prompt(&self, message: &Message) -> String {
        let server_descriptions: Vec<String> = self
            .supervisor
            .servers()
            .iter()
            .map(|server| format!("- {}: {}", server.name, server.description))
            .collect();

        formatdoc! {r#"
            Based on this user message: "{content}"

            The following tool servers are available:
            {servers}

            Choose which servers would provide tools most useful for answering this message.
            Return ONLY a JSON list of server names, like: ["math", "weather"]
            If no servers are relevant, return an empty list: []
        "#,
            content = message.content,
            servers = server_descriptions.join("\n"),
        }
    }

    fn parse_selection(text: &str) -> AgentResult<Vec<String>> {
        serde_json::from_str::<Vec<String>>(text)
            .map_err(|e| AgentError::MalformedSelection(e.to_string()))
    }

    fn all_server_names(&self) -> Vec<String> {
        self.supervisor
            .servers()
            .iter()
            .map(|server| server.name.clone())
            .collect()
    }

    fn registry_tools(&self) -> Vec<Tool> {
        self.supervisor.registry().lock().unwrap().tools()
    }
}

#[async_trait]
impl ToolManager for AdaptiveToolManager {
    async fn update_tools(
        &mut self,
        message: &Message,
        current_tools: Vec<Tool>,
    ) -> AgentResult<Vec<Tool>> {
        if self.supervisor.servers().is_empty() {
            return Ok(current_tools);
        }

        let request = Request::builder(self.model)
            .messages(vec![Message::system(self.selection_prompt(message))])
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()?;

        let completion = match self.provider.complete(&request).await {
            Ok(completion) => completion,
            Err(e) => {
                // auxiliary inference failures never fail the turn
                warn!(error = %e, "server selection call failed, keeping current tools");
                return Ok(current_tools);
            }
        };

        let known: HashSet<String> = self.all_server_names().into_iter().collect();
        let selected = match Self::parse_selection(completion.text().trim()) {
            Ok(names) => {
                let valid: Vec<String> =
                    names.into_iter().filter(|name| known.contains(name)).collect();
                if valid.is_empty() && self.default_connect_all {
                    self.all_server_names()
                } else {
                    valid
                }
            }
            Err(e) => {
                if self.default_connect_all {
                    debug!(error = %e, "malformed server selection, connecting all servers");
                    self.all_server_names()
                } else {
                    debug!(error = %e, "malformed server selection, keeping current tools");
                    return Ok(current_tools);
                }
            }
        };

        let desired: HashSet<String> = selected.into_iter().collect();
        self.supervisor.reconcile(&desired).await?;

        Ok(self.registry_tools())
    }
}
