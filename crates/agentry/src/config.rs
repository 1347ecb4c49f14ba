use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::models::model::Model;

pub const DEFAULT_PROMPT: &str = "You are a helpful assistant";

/// Plain key/value construction-time configuration for an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub agent_id: String,
    #[serde(default)]
    pub description: String,
    pub default_model: Option<Model>,
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub extra: HashMap<String, Value>,
}

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_id: String::new(),
            description: String::new(),
            default_model: None,
            prompt: default_prompt(),
            requires: Vec::new(),
            extra: HashMap::new(),
        }
    }
}
