//! These models represent the objects passed around by the agent core
//!
//! There are several related formats we need to interact with:
//! - the canonical request, assembled by the agent from history + tools + prompt
//! - openai messages/tools, sent to OpenAI-style backends
//! - anthropic messages/tools, sent to Anthropic-style backends
//! - grok messages/tools, structurally openai-compatible
//!
//! These overlap to varying degrees. The canonical models below are not an
//! exact match for any wire format; the provider adapters own the conversion.
pub mod message;
pub mod model;
pub mod request;
pub mod role;
pub mod tool;
