pub mod anthropic;
pub mod base;
pub mod configs;
pub mod factory;
pub mod grok;
pub mod mock;
pub mod openai;
pub mod utils;
