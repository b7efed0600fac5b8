//! HTTP server lifecycle.
//!
//! [`start_server`] binds the listener and serves until the shared
//! [`Lifecycle`](cleanbot_core::Lifecycle) requests shutdown, then drains
//! in-flight requests and returns.

use std::net::SocketAddr;
use std::sync::Arc;

use cleanbot_core::config::InfrastructureConfig;
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Listen address.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// The TCP port to listen on. `0` picks a free port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from(&InfrastructureConfig::default())
    }
}

impl From<&InfrastructureConfig> for ServerConfig {
    fn from(infra: &InfrastructureConfig) -> Self {
        Self {
            host: infra.observer_host.clone(),
            port: infra.observer_port,
        }
    }
}

/// Errors that can occur when starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}

/// Bind a listener for `config`.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))?;

    TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))
}

/// Serve on an already-bound listener until shutdown is requested.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<(), ServerError> {
    let lifecycle = Arc::clone(&state.lifecycle);
    let router = build_router(state);

    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "HTTP server listening");
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { lifecycle.wait_for_shutdown().await })
        .await
        .map_err(|e| ServerError::Serve(e.to_string()))?;

    info!("HTTP server stopped");
    Ok(())
}

/// Bind and serve until shutdown is requested.
pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let listener = bind(config).await?;
    serve(listener, state).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use cleanbot_core::config::{BroadcastConfig, SimulationConfig};
    use cleanbot_core::{InMemorySessionLog, Lifecycle, RobotController};

    use super::*;

    fn app_state() -> Arc<AppState> {
        let controller = RobotController::new(
            SimulationConfig::default(),
            &BroadcastConfig::default(),
            Arc::new(InMemorySessionLog::new()),
        );
        Arc::new(AppState::new(controller, Arc::new(Lifecycle::new())))
    }

    #[test]
    fn config_follows_infrastructure() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8001);
    }

    #[tokio::test]
    async fn invalid_host_is_a_bind_error() {
        let config = ServerConfig {
            host: "not an address".to_owned(),
            port: 1,
        };
        assert!(matches!(bind(&config).await, Err(ServerError::Bind(_))));
    }

    #[tokio::test]
    async fn stops_on_shutdown_request() {
        let state = app_state();
        let lifecycle = Arc::clone(&state.lifecycle);
        let listener = bind(&ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 0,
        })
        .await
        .unwrap();

        let server = tokio::spawn(serve(listener, state));
        tokio::task::yield_now().await;
        lifecycle.request_shutdown();

        let joined = tokio::time::timeout(Duration::from_secs(5), server).await;
        assert!(matches!(joined, Ok(Ok(Ok(())))));
    }
}
