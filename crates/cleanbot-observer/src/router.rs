//! Axum router construction.
//!
//! Assembles the REST and `WebSocket` routes into a single [`Router`]
//! with CORS enabled for the dashboard.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete router.
///
/// - `GET /api/` (and `/api`) -- service banner
/// - `POST /api/robot/command` -- robot command
/// - `GET /api/robot/status` -- current state
/// - `GET /api/cleaning-logs` -- session history
/// - `GET /api/ws` -- `WebSocket` event stream
///
/// CORS allows any origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Banner
        .route("/api", get(handlers::index))
        .route("/api/", get(handlers::index))
        // Commands and state
        .route("/api/robot/command", post(handlers::command))
        .route("/api/robot/status", get(handlers::status))
        .route("/api/cleaning-logs", get(handlers::cleaning_logs))
        // WebSocket
        .route("/api/ws", get(ws::ws_robot))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
