//! Per-connection message processing (spec.md 4.I "MCP state machine").
//! One [`McpSession`] per open connection; connections are otherwise
//! independent of each other (spec.md 5 "different connections proceed
//! independently").

use crate::connection::ConnectionState;
use crate::protocol::{RpcError, RpcMessage, RpcRequest, PROTOCOL_VERSION};
use crate::tools::{tool_table, Tool, ToolContext};
use serde_json::{json, Value};
use tracing::{info, warn};

pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

pub struct McpSession {
    connection_id: String,
    ctx: ToolContext,
    tools: Vec<Tool>,
    server_info: ServerInfo,
    state: ConnectionState,
    is_initialized: bool,
}

impl McpSession {
    pub fn new(connection_id: impl Into<String>, ctx: ToolContext, server_info: ServerInfo) -> Self {
        Self {
            connection_id: connection_id.into(),
            ctx,
            tools: tool_table(),
            server_info,
            state: ConnectionState::Idle,
            is_initialized: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    /// `onOpen` (spec.md 4.I): the connection's first outgoing message,
    /// before any client request arrives.
    pub fn on_open(&self) -> RpcMessage {
        RpcMessage::notification("ping", json!({}))
    }

    /// `onMessage(bytes)`: parse, dispatch, and return every outgoing
    /// message produced, in the order they must be sent.
    pub async fn on_message(&mut self, bytes: &[u8]) -> Vec<RpcMessage> {
        let request = match crate::protocol::parse_request(bytes) {
            Ok(req) => req,
            Err(err) => {
                self.state = ConnectionState::Error;
                return vec![RpcMessage::error(None, err)];
            }
        };

        self.state = ConnectionState::ProcessingRequest;
        let id = request.id.clone();

        let outgoing = match request.method.as_str() {
            "initialize" => self.handle_initialize(&request),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => {
                self.state = ConnectionState::HandlingToolCall;
                self.handle_tools_call(&request).await
            }
            "ping" => vec![RpcMessage::notification("pong", json!({}))],
            other => {
                self.state = ConnectionState::Error;
                vec![RpcMessage::error(id, RpcError::method_not_found(other))]
            }
        };

        if self.state != ConnectionState::Error {
            self.state = ConnectionState::SendingResponse;
            self.state = ConnectionState::Completed;
        }

        info!(connection_id = %self.connection_id, method = %request.method, "mcp message handled");
        outgoing
    }

    fn handle_initialize(&mut self, request: &RpcRequest) -> Vec<RpcMessage> {
        self.is_initialized = true;
        let client_info = request.params.get("clientInfo").cloned();
        if client_info.is_none() {
            warn!(connection_id = %self.connection_id, "initialize called without clientInfo");
        }

        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": { "listChanged": true } },
            "serverInfo": { "name": self.server_info.name, "version": self.server_info.version },
        });
        vec![RpcMessage::result(request.id.clone(), result)]
    }

    fn handle_tools_list(&self, id: Option<Value>) -> Vec<RpcMessage> {
        let tools: Vec<Value> = self
            .tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema,
                })
            })
            .collect();
        vec![RpcMessage::result(id, json!({ "tools": tools }))]
    }

    async fn handle_tools_call(&mut self, request: &RpcRequest) -> Vec<RpcMessage> {
        let id = request.id.clone();
        let Some(name) = request.params.get("name").and_then(Value::as_str) else {
            self.state = ConnectionState::Error;
            return vec![RpcMessage::error(
                id,
                RpcError::invalid_params("tools/call requires params.name"),
            )];
        };

        let Some(tool) = self.tools.iter().find(|t| t.name == name) else {
            self.state = ConnectionState::Error;
            return vec![RpcMessage::error(id, RpcError::method_not_found(name))];
        };

        let arguments = request
            .params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| json!({}));

        match (tool.handler)(arguments, self.ctx.clone()).await {
            Ok(payload) => {
                let text = serde_json::to_string(&payload).unwrap_or_default();
                let result = json!({
                    "content": [{ "type": "text", "text": text }],
                    "isError": false,
                });
                vec![RpcMessage::result(id, result)]
            }
            Err(e) => {
                self.state = ConnectionState::Error;
                vec![RpcMessage::error(id, RpcError::internal(e.to_string()))]
            }
        }
    }
}
