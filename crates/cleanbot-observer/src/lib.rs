//! HTTP command gateway and `WebSocket` push channel for the cleanbot
//! robot controller.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Command endpoint** (`POST /api/robot/command`) forwarding to the
//!   [`CommandGateway`](cleanbot_core::CommandGateway)
//! - **Status endpoint** (`GET /api/robot/status`) returning the current
//!   state snapshot
//! - **History endpoint** (`GET /api/cleaning-logs`) listing recent sessions
//! - **`WebSocket` endpoint** (`GET /api/ws`) streaming every robot event,
//!   starting with a snapshot of the state at connect time
//!
//! # Architecture
//!
//! Handlers hold a [`RobotController`](cleanbot_core::RobotController)
//! handle and never touch robot state directly. Each `WebSocket` task owns
//! one broadcaster subscription; a client that cannot keep up is evicted
//! by the broadcaster and its socket closed.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ObserverError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use startup::spawn_observer;
pub use state::AppState;
