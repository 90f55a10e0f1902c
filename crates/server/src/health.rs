//! `GET /health` (teacher's `handlers::health`/`health_detailed` shape):
//! a liveness line plus checkpointer-backed stats for the plan and
//! codegen engines and the current MCP connection count.

use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    connections: usize,
    plan: forge_checkpoint::CheckpointStats,
    codegen: forge_checkpoint::CheckpointStats,
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let plan = state.plan_engine.get_stats().await;
    let codegen = state.codegen_engine.get_stats().await;

    match (plan, codegen) {
        (Ok(plan), Ok(codegen)) => {
            let body = HealthResponse {
                status: "ok",
                connections: state.connections.active_connections(),
                plan,
                codegen,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        _ => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "error" })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::state::test_state;
    use axum::extract::State;

    #[tokio::test]
    async fn health_reports_ok_with_zero_connections_on_a_fresh_state() {
        let state = test_state(ServerConfig::default());
        let response = health(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
