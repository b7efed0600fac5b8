//! Shared application state for the HTTP server.

use std::sync::Arc;

use cleanbot_core::{CommandGateway, Lifecycle, RobotController};

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug)]
pub struct AppState {
    /// The robot.
    pub controller: RobotController,
    /// Command entry point wrapping `controller`.
    pub gateway: CommandGateway,
    /// Shutdown signal; the server drains when it fires.
    pub lifecycle: Arc<Lifecycle>,
}

impl AppState {
    /// Build the state around a controller handle.
    pub fn new(controller: RobotController, lifecycle: Arc<Lifecycle>) -> Self {
        Self {
            gateway: CommandGateway::new(controller.clone()),
            controller,
            lifecycle,
        }
    }
}
