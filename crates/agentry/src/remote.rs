//! Remote tool servers: endpoints that expose a named set of invocable tools
//! over an MCP-style session protocol. The supervisor owns all live
//! connections and reconciles them against a desired server set.
pub mod client;
pub mod supervisor;

use serde::{Deserialize, Serialize};

/// Definition of a remote tool server the supervisor may connect to.
/// Distinct server names may share an endpoint URL; the underlying client
/// connection is shared in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteServer {
    pub name: String,
    pub endpoint: String,
    pub description: String,
}

impl RemoteServer {
    pub fn new<N, E, D>(name: N, endpoint: E, description: D) -> Self
    where
        N: Into<String>,
        E: Into<String>,
        D: Into<String>,
    {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            description: description.into(),
        }
    }
}
