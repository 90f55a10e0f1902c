//! JSON-RPC 2.0 framing (spec.md 4.I, 6.1). A small parser and a sum
//! type rather than a general-purpose JSON-RPC library, since MCP only
//! ever needs a handful of shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// An incoming request or notification. `id` is absent for
/// notifications (e.g. a client-sent `pong` acknowledgement, were one
/// ever sent — this server itself only emits notifications, it does
/// not expect them).
#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    #[allow(dead_code)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("method not found: {method}"))
    }

    pub fn invalid_params(detail: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, detail.into())
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, detail.into())
    }
}

/// An outgoing message: either a response matching a request `id`, or a
/// server-initiated notification (no `id`). Both are framed the same
/// way on the wire, so one enum covers both (spec.md 4.I "outgoing
/// messages").
#[derive(Debug, Clone, Serialize)]
pub struct RpcMessage {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcMessage {
    pub fn result(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: None,
            params: None,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: None,
            params: None,
            result: None,
            error: Some(error),
        }
    }

    pub fn notification(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id: None,
            method: Some(method.into()),
            params: Some(params),
            result: None,
            error: None,
        }
    }
}

/// Parse one incoming frame. A frame that doesn't even deserialize as a
/// JSON-RPC request is reported with `-32600 invalid request` rather
/// than propagated as a transport error — the connection stays open
/// (spec.md 6.5 "Protocol" error category).
pub fn parse_request(bytes: &[u8]) -> std::result::Result<RpcRequest, RpcError> {
    serde_json::from_slice(bytes)
        .map_err(|e| RpcError::new(INVALID_REQUEST, format!("invalid request: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_request() {
        let raw = br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#;
        let req = parse_request(raw).unwrap();
        assert_eq!(req.method, "ping");
        assert_eq!(req.id, Some(Value::from(1)));
    }

    #[test]
    fn malformed_json_is_reported_as_invalid_request() {
        let raw = b"not json";
        let err = parse_request(raw).unwrap_err();
        assert_eq!(err.code, INVALID_REQUEST);
    }

    #[test]
    fn missing_method_is_reported_as_invalid_request() {
        let raw = br#"{"jsonrpc":"2.0","id":1}"#;
        let err = parse_request(raw).unwrap_err();
        assert_eq!(err.code, INVALID_REQUEST);
    }
}
