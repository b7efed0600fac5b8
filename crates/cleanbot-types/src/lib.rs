//! Shared type definitions for the cleanbot robot controller.
//!
//! This crate is the single source of truth for every type that crosses a
//! boundary: the command gateway, the push channel and the session log.
//! Types flow downstream to `TypeScript` via `ts-rs` for the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for sessions and subscribers
//! - [`enums`] -- Status, mode, pause reason, outcome and command kinds
//! - [`structs`] -- State snapshot and session history record
//! - [`events`] -- The push-channel event envelope
//! - [`commands`] -- Command request/result types

pub mod commands;
pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use commands::{CommandRequest, CommandResult};
pub use enums::{CleaningMode, CommandKind, PauseReason, RobotStatus, SessionOutcome};
pub use events::RobotEvent;
pub use ids::{SessionId, SubscriberId};
pub use structs::{RobotStateSnapshot, SessionRecord, elapsed_seconds};
