//! The MCP WebSocket endpoint (spec.md 6.1, default path `/operator`).
//! Grounded on axum's own `WebSocketUpgrade` idiom — the teacher's own
//! `api::ws::handler::ws_handler` is an unfinished placeholder that
//! never actually upgrades a connection, so the upgrade/split/forward
//! loop here follows axum's documented pattern instead, while the
//! connection bookkeeping around it (`ConnectionRegistry::register`/
//! `deregister`) still comes from the teacher's `ws::pool`.

use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use forge_mcp::{McpSession, ServerInfo, ToolContext};
use uuid::Uuid;

pub async fn mcp_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(mut socket: WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4().to_string();
    state.connections.register(connection_id.clone());

    let ctx = ToolContext {
        jobs: state.jobs.clone(),
        plan_engine: state.plan_engine.clone(),
        graph_store: state.graph_store.clone(),
    };
    let server_info = ServerInfo {
        name: "forgegraph".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let mut session = McpSession::new(connection_id.clone(), ctx, server_info);

    if send(&mut socket, &session.on_open()).await.is_err() {
        state.connections.deregister(&connection_id);
        return;
    }

    while let Some(incoming) = socket.recv().await {
        let bytes = match incoming {
            Ok(Message::Text(text)) => text.into_bytes(),
            Ok(Message::Binary(bin)) => bin,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(_) => break,
        };

        if let Some(entry) = state.connections.get(&connection_id) {
            entry.touch();
        }

        for outgoing in session.on_message(&bytes).await {
            if send(&mut socket, &outgoing).await.is_err() {
                break;
            }
        }
    }

    state.connections.deregister(&connection_id);
}

async fn send(socket: &mut WebSocket, message: &forge_mcp::RpcMessage) -> Result<(), axum::Error> {
    let text = serde_json::to_string(message).expect("RpcMessage always serializes");
    socket.send(Message::Text(text)).await
}
