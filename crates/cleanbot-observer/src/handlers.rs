//! REST endpoint handlers.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/` | Service banner |
//! | `POST` | `/api/robot/command` | Apply a start/stop/pause/resume command |
//! | `GET` | `/api/robot/status` | Current state snapshot |
//! | `GET` | `/api/cleaning-logs` | Recent sessions, newest first |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use cleanbot_types::{CommandRequest, CommandResult, RobotStateSnapshot, SessionRecord};
use serde::{Deserialize, Serialize};

use crate::error::ObserverError;
use crate::state::AppState;

/// Body of `GET /api/`.
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    /// Service banner.
    pub message: &'static str,
}

/// Body of `GET /api/robot/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Current state.
    pub robot_state: RobotStateSnapshot,
}

/// Query parameters for `GET /api/cleaning-logs`.
#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    /// Page size; defaults to 100 and is clamped to `1..=100`.
    pub limit: Option<usize>,
}

/// `GET /api/`
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Robot Control API",
    })
}

/// `POST /api/robot/command`
///
/// Always answers 200 with a [`CommandResult`]; a command that does not
/// fit the current state comes back with `accepted: false`. Bodies that
/// do not parse are rejected by the extractor before reaching here.
pub async fn command(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CommandRequest>,
) -> Json<CommandResult> {
    Json(state.gateway.execute(request).await)
}

/// `GET /api/robot/status`
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        robot_state: state.controller.snapshot().await,
    })
}

/// `GET /api/cleaning-logs?limit=N`
///
/// # Errors
///
/// Returns 503 if the session log cannot be read.
pub async fn cleaning_logs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LogsQuery>,
) -> Result<Json<Vec<SessionRecord>>, ObserverError> {
    let records = state.controller.recent_sessions(params.limit).await?;
    Ok(Json(records))
}
