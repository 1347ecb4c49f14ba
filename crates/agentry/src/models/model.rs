use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// The provider family a model belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Grok,
}

/// Known model identifiers across the supported provider families
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Model {
    #[serde(rename = "gpt-4o")]
    #[strum(serialize = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gpt-4o-mini")]
    #[strum(serialize = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gpt-4-turbo")]
    #[strum(serialize = "gpt-4-turbo")]
    Gpt4Turbo,
    #[serde(rename = "o1")]
    #[strum(serialize = "o1")]
    O1,
    #[serde(rename = "o1-2024-12-17")]
    #[strum(serialize = "o1-2024-12-17")]
    O1_2024_12_17,
    #[serde(rename = "o1-mini")]
    #[strum(serialize = "o1-mini")]
    O1Mini,
    #[serde(rename = "o1-preview")]
    #[strum(serialize = "o1-preview")]
    O1Preview,
    #[serde(rename = "claude-3-5-sonnet-20241022")]
    #[strum(serialize = "claude-3-5-sonnet-20241022")]
    Claude35Sonnet,
    #[serde(rename = "claude-3-5-haiku-20241022")]
    #[strum(serialize = "claude-3-5-haiku-20241022")]
    Claude35Haiku,
    #[serde(rename = "claude-3-opus-20240229")]
    #[strum(serialize = "claude-3-opus-20240229")]
    Claude3Opus,
    #[serde(rename = "grok-2-1212")]
    #[strum(serialize = "grok-2-1212")]
    Grok2,
    #[serde(rename = "grok-beta")]
    #[strum(serialize = "grok-beta")]
    GrokBeta,
}

impl Model {
    pub fn provider(&self) -> ProviderKind {
        match self {
            Model::Gpt4o
            | Model::Gpt4oMini
            | Model::Gpt4Turbo
            | Model::O1
            | Model::O1_2024_12_17
            | Model::O1Mini
            | Model::O1Preview => ProviderKind::OpenAi,
            Model::Claude35Sonnet | Model::Claude35Haiku | Model::Claude3Opus => {
                ProviderKind::Anthropic
            }
            Model::Grok2 | Model::GrokBeta => ProviderKind::Grok,
        }
    }

    /// Reasoning variants reject system messages and the `max_tokens`/`tools`
    /// request fields, so adapters refine requests for them separately.
    pub fn is_reasoning(&self) -> bool {
        matches!(
            self,
            Model::O1 | Model::O1_2024_12_17 | Model::O1Mini | Model::O1Preview
        )
    }

    /// The provider-specific ceiling for the `max_tokens` request field.
    /// Requests above this fail validation at construction time.
    pub fn max_tokens_ceiling(&self) -> i32 {
        match self.provider() {
            ProviderKind::OpenAi => 128_000,
            ProviderKind::Anthropic => 8_192,
            ProviderKind::Grok => 131_072,
        }
    }

    /// Whether the provider/model combination supports structured output
    pub fn supports_response_format(&self) -> bool {
        self.provider() == ProviderKind::OpenAi && !self.is_reasoning()
    }
}
