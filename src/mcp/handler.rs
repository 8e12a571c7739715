//! MCP Stdio Handler
//!
//! Serves MCP over a line-delimited byte stream: one JSON message per input
//! line, one JSON response per output line.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::protocol::{
    methods, InitializeParams, InitializeResult, McpError, McpRequest, McpResponse, PingResult,
    RequestId, ServerCapabilities, ServerInfo, ToolsCallParams, ToolsCallResult, ToolsCapability,
    ToolsListResult, MCP_PROTOCOL_VERSION,
};
use super::registry::{McpRegistry, ToolHandler};
use super::tools::echo;
use crate::registry::Registry;
use crate::remote::{ClientSettings, RemoteClient, RemoteEndpointConfig, ToolInvoker};

/// Error message returned by remote tools when no endpoint is configured.
pub const CONFIGURATION_MISSING_MESSAGE: &str = "GAS configuration not found. \
Create .mcp-gas.json with a gasUrl (and apiToken if required) to call remote tools.";

/// Outcome of reading one inbound message.
enum Dispatch {
    Reply(McpResponse),
    Call {
        id: RequestId,
        params: Option<Value>,
    },
    Silent,
}

/// MCP server bridging registered tools to the local echo handler or the
/// remote endpoint.
#[derive(Clone)]
pub struct BridgeServer {
    registry: Arc<McpRegistry>,
    invoker: Option<Arc<dyn ToolInvoker>>,
}

impl BridgeServer {
    pub fn new(registry: &Registry, invoker: Option<Arc<dyn ToolInvoker>>) -> Self {
        let mcp_registry = McpRegistry::from_registry(registry);
        info!(
            "MCP registry initialized with {} tools ({} remote), endpoint {}",
            mcp_registry.tool_count(),
            mcp_registry.remote_tool_count(),
            if invoker.is_some() {
                "configured"
            } else {
                "not configured"
            }
        );
        Self {
            registry: Arc::new(mcp_registry),
            invoker,
        }
    }

    /// Load the tools file and the endpoint configuration.
    ///
    /// A missing tools file falls back to the echo tool, a missing endpoint
    /// configuration leaves remote tools failing on call.
    pub async fn load(
        tools_file: &Path,
        endpoint_file: &Path,
        settings: &ClientSettings,
    ) -> Result<Self> {
        let registry = Registry::load_or_echo(tools_file).await;

        let invoker: Option<Arc<dyn ToolInvoker>> =
            match RemoteEndpointConfig::load(endpoint_file, settings).await {
                Some(config) => Some(Arc::new(
                    RemoteClient::new(&config).context("Failed to create remote endpoint client")?,
                )),
                None => None,
            };

        Ok(Self::new(&registry, invoker))
    }

    pub fn registry(&self) -> &McpRegistry {
        &self.registry
    }

    pub fn has_endpoint(&self) -> bool {
        self.invoker.is_some()
    }

    /// Serve until `reader` reaches end of input and in-flight calls finish.
    pub async fn serve<R, W>(&self, mut reader: R, writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<McpResponse>();
        let writer_task = tokio::spawn(write_responses(writer, rx));

        let mut buf = Vec::new();
        let mut initialized = false;

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .await
                .context("Failed to read MCP input")?;
            if read == 0 {
                break;
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    warn!("Received MCP input that is not valid UTF-8: {}", e);
                    let response = McpResponse::error(None, McpError::ParseError(e.to_string()));
                    if tx.send(response).is_err() {
                        break;
                    }
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            match self.dispatch(line, &mut initialized) {
                Dispatch::Reply(response) => {
                    if tx.send(response).is_err() {
                        break;
                    }
                }
                Dispatch::Call { id, params } => {
                    let server = self.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let result = server.handle_tools_call(params).await;
                        // Receiver gone means the output closed, nothing to report to
                        let _ = tx.send(McpResponse::from_result(id, result));
                    });
                }
                Dispatch::Silent => {}
            }
        }

        debug!("MCP input closed, waiting for in-flight calls");
        drop(tx);
        writer_task.await.context("MCP writer task failed")?
    }

    fn dispatch(&self, text: &str, initialized: &mut bool) -> Dispatch {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                return Dispatch::Reply(McpResponse::error(
                    None,
                    McpError::ParseError(e.to_string()),
                ));
            }
        };

        let request: McpRequest = match serde_json::from_value(value.clone()) {
            Ok(request) => request,
            Err(e) => {
                let id = value
                    .get("id")
                    .cloned()
                    .and_then(|id| serde_json::from_value(id).ok());
                return Dispatch::Reply(McpResponse::error(
                    id,
                    McpError::InvalidRequest(e.to_string()),
                ));
            }
        };

        let id = match request.id.clone() {
            Some(id) => id,
            None => {
                // Notification, no response needed
                debug!("Received notification {}", request.method);
                return Dispatch::Silent;
            }
        };

        let result = match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(&request, initialized),
            methods::INITIALIZED => return Dispatch::Silent,
            methods::PING => handle_ping(),
            methods::TOOLS_LIST => {
                if !*initialized {
                    Err(McpError::InvalidRequest("Not initialized".to_string()))
                } else {
                    self.handle_tools_list()
                }
            }
            methods::TOOLS_CALL => {
                if !*initialized {
                    Err(McpError::InvalidRequest("Not initialized".to_string()))
                } else {
                    return Dispatch::Call {
                        id,
                        params: request.params,
                    };
                }
            }
            other => Err(McpError::MethodNotFound(other.to_string())),
        };

        Dispatch::Reply(McpResponse::from_result(id, result))
    }

    fn handle_initialize(
        &self,
        request: &McpRequest,
        initialized: &mut bool,
    ) -> Result<Value, McpError> {
        let params: InitializeParams = request
            .params
            .clone()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .unwrap_or_default();

        info!(
            "MCP client initialized: {} (protocol {})",
            params
                .client_info
                .as_ref()
                .map(|c| c.name.as_str())
                .unwrap_or("unknown"),
            params
                .protocol_version
                .as_deref()
                .unwrap_or(MCP_PROTOCOL_VERSION)
        );

        *initialized = true;

        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability { list_changed: None },
            },
            server_info: ServerInfo::current(),
        };

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    fn handle_tools_list(&self) -> Result<Value, McpError> {
        let result = ToolsListResult {
            tools: self.registry.list_tools(),
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: ToolsCallParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("Missing params".to_string()))?;

        let arguments = params.arguments.unwrap_or_else(|| json!({}));
        let result = self.call_tool(&params.name, arguments).await?;

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    /// Execute a registered tool.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolsCallResult, McpError> {
        let tool = self
            .registry
            .get_tool(name)
            .ok_or_else(|| McpError::MethodNotFound(format!("Unknown tool: {}", name)))?;

        let routing_key = match &tool.handler {
            ToolHandler::Local => return echo::call(arguments),
            ToolHandler::Remote { routing_key } => routing_key,
        };

        let invoker = match &self.invoker {
            Some(invoker) => invoker,
            None => {
                warn!("Tool {} called without an endpoint configuration", name);
                return Err(McpError::ConfigurationMissing(
                    CONFIGURATION_MISSING_MESSAGE.to_string(),
                ));
            }
        };

        info!("Forwarding tool {} to remote function {}", name, routing_key);
        match invoker.call_tool(routing_key, arguments).await {
            Ok(result) => ToolsCallResult::json(&result)
                .map_err(|e| McpError::InternalError(e.to_string())),
            Err(e) => {
                warn!("Tool {} failed ({}): {}", name, e.error_type.as_str(), e);
                Err(McpError::ToolExecutionFailed(e.message))
            }
        }
    }
}

fn handle_ping() -> Result<Value, McpError> {
    serde_json::to_value(PingResult {}).map_err(|e| McpError::InternalError(e.to_string()))
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<McpResponse>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize MCP response: {}", e);
                continue;
            }
        };
        writer
            .write_all(json.as_bytes())
            .await
            .context("Failed to write MCP response")?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}
