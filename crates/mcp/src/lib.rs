//! `forge-mcp` — component (I): the Model Context Protocol processor.
//! JSON-RPC 2.0 framing, a connection registry, a per-connection state
//! machine, and the fixed sixteen-tool catalogue that adapts MCP
//! `tools/call` requests into calls on (H) and the graph store.

pub mod connection;
pub mod error;
pub mod protocol;
pub mod session;
pub mod tools;

pub use connection::{ConnectionEntry, ConnectionRegistry, ConnectionState};
pub use error::{McpError, Result};
pub use protocol::{RpcError, RpcMessage, RpcRequest};
pub use session::{McpSession, ServerInfo};
pub use tools::{tool_table, Tool, ToolContext};
