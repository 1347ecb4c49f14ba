use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Malformed server selection: {0}")]
    MalformedSelection(String),

    #[error("Connection failure: {0}")]
    ConnectionFailure(String),

    #[error("Unsupported request shape: {0}")]
    UnsupportedRequestShape(String),

    #[error("Validation failure: {0}")]
    ValidationFailure(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
