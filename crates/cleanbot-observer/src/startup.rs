//! Background startup for embedding the server in the engine binary.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError, bind, serve};
use crate::state::AppState;

/// Bind the listener, then serve on a background task.
///
/// Binding happens before the task is spawned so a port conflict is
/// reported to the caller instead of being logged from the background.
/// The task ends after the lifecycle in `state` requests shutdown.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, ServerError> {
    let listener = bind(config).await?;

    let handle = tokio::spawn(async move {
        if let Err(e) = serve(listener, state).await {
            tracing::error!(error = %e, "HTTP server exited with error");
        }
    });

    tracing::info!(host = %config.host, port = config.port, "HTTP server spawned on background task");
    Ok(handle)
}
