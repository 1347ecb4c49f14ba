use anyhow::Result;
use indoc::indoc;
use std::sync::{Arc, Mutex};

use crate::config::{AgentConfig, DEFAULT_PROMPT};
use crate::errors::{AgentError, AgentResult};
use crate::history::Conversation;
use crate::managers::{PromptManager, ToolManager};
use crate::models::message::Message;
use crate::models::model::Model;
use crate::models::request::Request;
use crate::models::tool::Tool;
use crate::providers::base::Provider;
use crate::registry::ToolRegistry;
use crate::skills::Skill;

/// Transforms the conversation before completion, for uses like RAG
pub type Middleware = Arc<dyn Fn(Vec<Message>) -> Vec<Message> + Send + Sync>;

const DEFAULT_SUMMARY_PROMPT: &str = indoc! {"
    You are an assistant that summarizes conversations concisely.
    Dont worry about human readability, just focus on conciseness.
"};

const DEFAULT_COMPLETION_TOKENS: i32 = 1_000;

/// Integrates a foundational LLM with the tools and prompt it needs per turn.
///
/// The per-turn flow is: incoming user message, tool manager (may reconnect
/// remote servers), prompt manager, canonical request assembly from history +
/// active tools + active prompt, provider completion, response appended to
/// history.
pub struct Agent {
    provider: Box<dyn Provider>,
    registry: Arc<Mutex<ToolRegistry>>,
    conversation: Conversation,
    prompt: String,
    default_model: Model,
    max_tokens: i32,
    tool_manager: Option<Box<dyn ToolManager>>,
    prompt_manager: Option<Box<dyn PromptManager>>,
    middleware: Vec<Middleware>,
}

impl Agent {
    pub fn new(provider: Box<dyn Provider>, default_model: Model) -> Self {
        Self {
            provider,
            registry: Arc::new(Mutex::new(ToolRegistry::new())),
            conversation: Conversation::new(),
            prompt: DEFAULT_PROMPT.to_string(),
            default_model,
            max_tokens: DEFAULT_COMPLETION_TOKENS,
            tool_manager: None,
            prompt_manager: None,
            middleware: Vec::new(),
        }
    }

    pub fn from_config(config: &AgentConfig, provider: Box<dyn Provider>) -> AgentResult<Self> {
        let model = config.default_model.ok_or_else(|| {
            AgentError::ValidationFailure("agent config requires a default model".into())
        })?;
        Ok(Self::new(provider, model).with_prompt(config.prompt.clone()))
    }

    pub fn with_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: i32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Share a registry with a supervisor-driven tool manager so reconciled
    /// tools become visible to request assembly
    pub fn with_registry(mut self, registry: Arc<Mutex<ToolRegistry>>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_tool_manager(mut self, tool_manager: Box<dyn ToolManager>) -> Self {
        self.tool_manager = Some(tool_manager);
        self
    }

    pub fn with_prompt_manager(mut self, prompt_manager: Box<dyn PromptManager>) -> Self {
        self.prompt_manager = Some(prompt_manager);
        self
    }

    pub fn with_middleware(mut self, middleware: Middleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Load a skill's tools. Unlike dynamic reconnection, a name conflict
    /// here is surfaced to the caller.
    pub fn add_skill(&mut self, skill: &Skill) -> AgentResult<()> {
        let mut registry = self.registry.lock().unwrap();
        for (tool, handler) in skill.tools() {
            registry.register(tool.clone(), handler.clone())?;
        }
        Ok(())
    }

    pub fn registry(&self) -> Arc<Mutex<ToolRegistry>> {
        self.registry.clone()
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.registry.lock().unwrap().tools()
    }

    pub fn system_prompt(&self) -> &str {
        &self.prompt
    }

    pub fn history(&self) -> Vec<Message> {
        self.conversation.get_history()
    }

    pub fn add_message(&mut self, message: Message) {
        self.conversation.add_message(message);
    }

    pub fn add_messages(&mut self, messages: Vec<Message>) {
        self.conversation.add_messages(messages);
    }

    pub fn reset(&mut self) {
        self.conversation.reset();
    }

    /// Append a user message, run the adaptive managers, and complete the
    /// conversation until no more tool calls. The tool list returned by the
    /// tool manager is the active set for this turn.
    pub async fn answer(&mut self, question: &str) -> Result<String> {
        let message = Message::user(question);
        self.conversation.add_message(message.clone());

        let mut active_tools = self.registry.lock().unwrap().tools();
        if let Some(tool_manager) = self.tool_manager.as_mut() {
            active_tools = tool_manager.update_tools(&message, active_tools).await?;
        }
        if let Some(prompt_manager) = self.prompt_manager.as_mut() {
            self.prompt = prompt_manager.update_prompt(&message, &self.prompt).await?;
        }

        let history = self.conversation.get_history();
        self.run_loop(history, active_tools, true).await
    }

    /// Send a one-off question without touching the stored history. The
    /// active prompt rides on the request's system field.
    pub async fn respond(&mut self, question: &str) -> Result<String> {
        let tools = self.registry.lock().unwrap().tools();
        self.run_loop(vec![Message::user(question)], tools, false).await
    }

    /// Complete the current conversation until no more tool calls
    pub async fn complete(&mut self) -> Result<String> {
        let history = self.conversation.get_history();
        let tools = self.registry.lock().unwrap().tools();
        self.run_loop(history, tools, true).await
    }

    /// Summarize the conversation so far; when `update` is set, the history
    /// is replaced by the summary message
    pub async fn summarize(&mut self, update: bool) -> Result<String> {
        let formatted = format_conversation(&self.conversation.get_history());
        let request = Request::builder(self.default_model)
            .messages(vec![
                Message::system(DEFAULT_SUMMARY_PROMPT),
                Message::user(format!(
                    "Summarize the following conversation:\n\n{}",
                    formatted
                )),
            ])
            .temperature(0.5)
            .max_tokens(500)
            .build()?;

        let completion = self.provider.complete(&request).await?;
        let summary = completion.message.content.clone();
        if update {
            self.conversation.set_history(vec![completion.message]);
        }
        Ok(summary)
    }

    async fn run_loop(
        &mut self,
        mut conversation: Vec<Message>,
        active_tools: Vec<Tool>,
        persist: bool,
    ) -> Result<String> {
        for middleware in &self.middleware {
            conversation = middleware(conversation);
        }

        loop {
            let mut builder = Request::builder(self.default_model)
                .messages(conversation.clone())
                .system(self.prompt.clone())
                .max_tokens(self.max_tokens);
            if !active_tools.is_empty() {
                builder = builder.tools(active_tools.clone());
            }
            let request = builder.build()?;

            let completion = self.provider.complete(&request).await?;
            conversation.push(completion.message.clone());

            if completion.tool_calls.is_empty() {
                if persist {
                    self.conversation.set_history(conversation);
                }
                return Ok(completion.message.content);
            }

            for call in &completion.tool_calls {
                let handler = self.registry.lock().unwrap().handler(&call.name);
                let result = match handler {
                    Some(handler) => handler
                        .invoke(call.arguments.clone())
                        .await
                        .unwrap_or_else(|e| format!("Error: {}", e)),
                    None => format!("Error: {}", AgentError::ToolNotFound(call.name.clone())),
                };
                conversation.push(Message::tool(result, call.id.clone()));
            }

            if persist {
                self.conversation.set_history(conversation.clone());
            }
        }
    }
}

/// Format a conversation as readable role-prefixed lines
pub fn format_conversation(conversation: &[Message]) -> String {
    conversation
        .iter()
        .map(|message| format!("{}: {}\n", capitalize(message.role.as_str()), message.content))
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("model", &self.default_model)
            .field("prompt", &self.prompt)
            .field("tools", &self.tools().len())
            .field("history", &self.conversation.len())
            .finish()
    }
}
