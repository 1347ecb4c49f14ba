use anyhow::Result;

use super::anthropic::AnthropicProvider;
use super::base::Provider;
use super::configs::ProviderConfig;
use super::grok::GrokProvider;
use super::openai::OpenAiProvider;

pub fn get_provider(config: ProviderConfig) -> Result<Box<dyn Provider + Send + Sync>> {
    match config {
        ProviderConfig::OpenAi(openai_config) => Ok(Box::new(OpenAiProvider::new(openai_config)?)),
        ProviderConfig::Anthropic(anthropic_config) => {
            Ok(Box::new(AnthropicProvider::new(anthropic_config)?))
        }
        ProviderConfig::Grok(grok_config) => Ok(Box::new(GrokProvider::new(grok_config)?)),
    }
}
