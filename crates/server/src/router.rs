//! Builds the complete axum router (teacher's `api::routes::create_router`
//! shape: one function taking the shared state, returning a `Router`).

use crate::auth::require_session;
use crate::health::health;
use crate::state::AppState;
use crate::ws::mcp_upgrade;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new().route("/health", get(health));

    if state.config.mcp_enabled {
        let mcp_route = Router::new()
            .route(&state.config.mcp_path, get(mcp_upgrade))
            .layer(middleware::from_fn_with_state(state.clone(), require_session));
        router = router.merge(mcp_route);
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
