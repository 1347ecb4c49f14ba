use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{AgentError, AgentResult};
use crate::models::tool::{Tool, ToolHandler};

/// The single source of truth for the currently-callable tool set.
///
/// Registration order is preserved, which keeps the tool list handed to the
/// request assembly stable across turns.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool with its capability. Fails with `DuplicateTool` if the
    /// name is taken; the prior entry is left unchanged.
    pub fn register(&mut self, tool: Tool, handler: Arc<dyn ToolHandler>) -> AgentResult<()> {
        if self.handlers.contains_key(&tool.name) {
            return Err(AgentError::DuplicateTool(tool.name.clone()));
        }
        self.handlers.insert(tool.name.clone(), handler);
        self.tools.push(tool);
        Ok(())
    }

    /// Remove a tool by name, returning it if it was present
    pub fn unregister(&mut self, name: &str) -> Option<Tool> {
        self.handlers.remove(name)?;
        let index = self.tools.iter().position(|tool| tool.name == name)?;
        Some(self.tools.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    pub fn handler(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.get(name).cloned()
    }

    /// The current tool set, in registration order
    pub fn tools(&self) -> Vec<Tool> {
        self.tools.clone()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tool::FnToolHandler;
    use serde_json::{json, Value};

    fn echo_handler() -> Arc<dyn ToolHandler> {
        Arc::new(FnToolHandler(|args: Value| -> AgentResult<String> {
            Ok(args.to_string())
        }))
    }

    fn tool(name: &str, description: &str) -> Tool {
        Tool::new(name, description, json!({"type": "object"}))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry
            .register(tool("echo", "Echoes input"), echo_handler())
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("echo").unwrap().description, "Echoes input");
        assert!(registry.get("missing").is_none());
        assert!(registry.handler("echo").is_some());
    }

    #[test]
    fn test_duplicate_registration_leaves_prior_entry() {
        let mut registry = ToolRegistry::new();
        registry
            .register(tool("echo", "original"), echo_handler())
            .unwrap();

        let err = registry
            .register(tool("echo", "imposter"), echo_handler())
            .unwrap_err();
        assert_eq!(err, AgentError::DuplicateTool("echo".to_string()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("echo").unwrap().description, "original");
    }

    #[test]
    fn test_unregister() {
        let mut registry = ToolRegistry::new();
        registry
            .register(tool("echo", "Echoes input"), echo_handler())
            .unwrap();

        assert!(registry.unregister("echo").is_some());
        assert!(registry.is_empty());
        assert!(registry.handler("echo").is_none());
        assert!(registry.unregister("echo").is_none());
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let mut registry = ToolRegistry::new();
        for name in ["c", "a", "b"] {
            registry.register(tool(name, "t"), echo_handler()).unwrap();
        }
        let names: Vec<String> = registry.tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
