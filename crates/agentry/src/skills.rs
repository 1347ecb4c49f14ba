use std::sync::Arc;

use crate::models::tool::{Tool, ToolHandler};

/// A named bundle of tools loaded statically at agent construction.
///
/// Unlike the dynamic reconnect path, loading a skill surfaces
/// `DuplicateTool` to the caller instead of swallowing it: two skills
/// claiming the same tool name is a configuration bug.
pub struct Skill {
    pub name: String,
    pub description: String,
    tools: Vec<(Tool, Arc<dyn ToolHandler>)>,
}

impl Skill {
    pub fn new<N, D>(name: N, description: D) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            tools: Vec::new(),
        }
    }

    pub fn with_tool(mut self, tool: Tool, handler: Arc<dyn ToolHandler>) -> Self {
        self.tools.push((tool, handler));
        self
    }

    pub fn tools(&self) -> &[(Tool, Arc<dyn ToolHandler>)] {
        &self.tools
    }
}
