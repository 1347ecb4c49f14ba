//! Adaptive managers that revise the active tool set and system prompt
//! before each agent turn, using auxiliary inference calls.
pub mod prompt;
pub mod tool;

use async_trait::async_trait;

use crate::errors::{AgentError, AgentResult};
use crate::models::message::Message;
use crate::models::tool::Tool;

/// Decides, per incoming message, the tools available for the next turn
#[async_trait]
pub trait ToolManager: Send + Sync {
    async fn update_tools(
        &mut self,
        message: &Message,
        current_tools: Vec<Tool>,
    ) -> AgentResult<Vec<Tool>>;

    /// Blocking form for callers without a runtime. Inside an active tokio
    /// runtime re-entering the scheduler would deadlock, so this degrades to
    /// returning the current tools unchanged.
    fn update_tools_blocking(
        &mut self,
        message: &Message,
        current_tools: Vec<Tool>,
    ) -> AgentResult<Vec<Tool>> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Ok(current_tools);
        }
        let runtime =
            tokio::runtime::Runtime::new().map_err(|e| AgentError::Internal(e.to_string()))?;
        runtime.block_on(self.update_tools(message, current_tools))
    }
}

/// Decides, per incoming message, the system prompt for the next turn
#[async_trait]
pub trait PromptManager: Send + Sync {
    async fn update_prompt(
        &mut self,
        message: &Message,
        current_prompt: &str,
    ) -> AgentResult<String>;

    /// Blocking form with the same non-blocking-context fallback as
    /// [`ToolManager::update_tools_blocking`]
    fn update_prompt_blocking(
        &mut self,
        message: &Message,
        current_prompt: &str,
    ) -> AgentResult<String> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Ok(current_prompt.to_string());
        }
        let runtime =
            tokio::runtime::Runtime::new().map_err(|e| AgentError::Internal(e.to_string()))?;
        runtime.block_on(self.update_prompt(message, current_prompt))
    }
}
