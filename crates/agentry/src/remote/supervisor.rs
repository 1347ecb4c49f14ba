use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use super::client::{ServerConnector, ToolServerClient};
use super::RemoteServer;
use crate::errors::{AgentError, AgentResult};
use crate::models::tool::ToolHandler;
use crate::registry::ToolRegistry;

/// Bridges a registered remote tool to the client connection that serves it
struct RemoteToolHandler {
    client: Arc<dyn ToolServerClient>,
    name: String,
}

#[async_trait]
impl ToolHandler for RemoteToolHandler {
    async fn invoke(&self, arguments: Value) -> AgentResult<String> {
        self.client.call_tool(&self.name, arguments).await
    }
}

struct ConnectedServer {
    endpoint: String,
    /// Tool names this server actually registered. Names that lost a
    /// duplicate-registration race are not attributed here, so disconnecting
    /// never removes another server's tools.
    registered: Vec<String>,
}

/// Owns the set of live remote tool-server connections and their registry
/// entries.
///
/// All mutation happens through [`reconcile`](Self::reconcile). Concurrent
/// reconciles against the same supervisor are not supported; callers run one
/// reconcile per agent turn.
pub struct ToolConnectionSupervisor {
    connector: Box<dyn ServerConnector>,
    registry: Arc<Mutex<ToolRegistry>>,
    servers: Vec<RemoteServer>,
    connected: HashMap<String, ConnectedServer>,
    clients: HashMap<String, Arc<dyn ToolServerClient>>,
}

impl ToolConnectionSupervisor {
    pub fn new(
        connector: Box<dyn ServerConnector>,
        registry: Arc<Mutex<ToolRegistry>>,
        servers: Vec<RemoteServer>,
    ) -> Self {
        Self {
            connector,
            registry,
            servers,
            connected: HashMap::new(),
            clients: HashMap::new(),
        }
    }

    /// The known server definitions, whether connected or not
    pub fn servers(&self) -> &[RemoteServer] {
        &self.servers
    }

    pub fn registry(&self) -> Arc<Mutex<ToolRegistry>> {
        self.registry.clone()
    }

    pub fn is_connected(&self, name: &str) -> bool {
        self.connected.contains_key(name)
    }

    pub fn connected_servers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.connected.keys().cloned().collect();
        names.sort();
        names
    }

    /// Bring live connections in line with the desired server-name set.
    ///
    /// All disconnects are applied before any connect begins, so a server
    /// present in both the connected and desired sets is never torn down. A
    /// connect or listing failure aborts the remaining connects; servers
    /// already connected in this pass stay connected, so callers should treat
    /// a failed reconcile as partially applied and may retry.
    pub async fn reconcile(&mut self, desired: &HashSet<String>) -> AgentResult<()> {
        let mut to_disconnect: Vec<String> = self
            .connected
            .keys()
            .filter(|name| !desired.contains(*name))
            .cloned()
            .collect();
        to_disconnect.sort();

        for name in to_disconnect {
            debug!(server = %name, "disconnecting tool server");
            self.disconnect(&name).await;
        }

        let to_connect: Vec<RemoteServer> = self
            .servers
            .iter()
            .filter(|server| {
                desired.contains(&server.name) && !self.connected.contains_key(&server.name)
            })
            .cloned()
            .collect();

        for server in to_connect {
            debug!(server = %server.name, endpoint = %server.endpoint, "connecting tool server");
            self.connect(server).await?;
        }

        Ok(())
    }

    /// Disconnect every server and close all clients
    pub async fn shutdown(&mut self) -> AgentResult<()> {
        self.reconcile(&HashSet::new()).await
    }

    async fn disconnect(&mut self, name: &str) {
        let entry = match self.connected.remove(name) {
            Some(entry) => entry,
            None => return,
        };

        {
            let mut registry = self.registry.lock().unwrap();
            for tool_name in &entry.registered {
                registry.unregister(tool_name);
            }
        }

        // A client shared by URL stays open while any other server name
        // still references it
        let still_referenced = self
            .connected
            .values()
            .any(|other| other.endpoint == entry.endpoint);
        if !still_referenced {
            if let Some(client) = self.clients.remove(&entry.endpoint) {
                if let Err(e) = client.close().await {
                    warn!(server = %name, error = %e, "error closing tool server client");
                }
            }
        }
    }

    async fn connect(&mut self, server: RemoteServer) -> AgentResult<()> {
        let (client, newly_created) = match self.clients.get(&server.endpoint) {
            Some(client) => (client.clone(), false),
            None => {
                let client = self.connector.connect(&server.endpoint).await?;
                client.create_session().await?;
                (client, true)
            }
        };

        let tools = match client.list_tools().await {
            Ok(tools) => tools,
            Err(e) => {
                // discard the partial client; it was never shared
                if newly_created {
                    let _ = client.close().await;
                }
                return Err(e);
            }
        };

        let mut registered = Vec::new();
        {
            let mut registry = self.registry.lock().unwrap();
            for tool in tools {
                let tool_name = tool.name.clone();
                let handler = Arc::new(RemoteToolHandler {
                    client: client.clone(),
                    name: tool_name.clone(),
                });
                match registry.register(tool, handler) {
                    Ok(()) => registered.push(tool_name),
                    Err(AgentError::DuplicateTool(name)) => {
                        debug!(server = %server.name, tool = %name, "tool already registered");
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        if newly_created {
            self.clients.insert(server.endpoint.clone(), client);
        }
        self.connected.insert(
            server.name,
            ConnectedServer {
                endpoint: server.endpoint,
                registered,
            },
        );

        Ok(())
    }
}
