use anyhow::{anyhow, Result};

pub const OPENAI_HOST: &str = "https://api.openai.com";
pub const ANTHROPIC_HOST: &str = "https://api.anthropic.com";
pub const GROK_HOST: &str = "https://api.x.ai";

fn required_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| anyhow!("Missing environment variable: {}", key))
}

#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
}

impl OpenAiProviderConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("OPENAI_HOST").unwrap_or_else(|_| OPENAI_HOST.to_string()),
            api_key: required_env("OPENAI_API_KEY")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AnthropicProviderConfig {
    pub host: String,
    pub api_key: String,
}

impl AnthropicProviderConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("ANTHROPIC_HOST").unwrap_or_else(|_| ANTHROPIC_HOST.to_string()),
            api_key: required_env("ANTHROPIC_API_KEY")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct GrokProviderConfig {
    pub host: String,
    pub api_key: String,
}

impl GrokProviderConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("GROK_HOST").unwrap_or_else(|_| GROK_HOST.to_string()),
            api_key: required_env("GROK_API_KEY")?,
        })
    }
}

/// Unified enum to wrap different provider configurations
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    OpenAi(OpenAiProviderConfig),
    Anthropic(AnthropicProviderConfig),
    Grok(GrokProviderConfig),
}
