//! State machine, simulation clock and event fan-out for the cleanbot
//! robot controller.
//!
//! This crate owns everything with timing, concurrency or consistency
//! concerns. Transports (HTTP, WebSocket) and storage backends plug in at
//! the [`CommandGateway`], [`Subscription`] and [`SessionLog`] seams.
//!
//! # Modules
//!
//! - [`robot`] -- The operational state machine and its transition rules.
//! - [`controller`] -- [`RobotController`], the shared application context
//!   that serializes every mutation and publishes its event.
//! - [`clock`] -- [`SimulationClock`], the periodic tick driver.
//! - [`obstacle`] -- [`ObstacleSensor`] trait with random and scripted
//!   sources.
//! - [`broadcast`] -- Per-subscriber bounded fan-out with eviction.
//! - [`session_log`] -- [`SessionLog`] trait and an in-memory log.
//! - [`gateway`] -- [`CommandGateway`], command to controller translation.
//! - [`lifecycle`] -- Shutdown signal shared across tasks.
//! - [`config`] -- Configuration loading from `cleanbot-config.yaml`.
//!
//! [`CommandGateway`]: gateway::CommandGateway
//! [`Subscription`]: broadcast::Subscription
//! [`SessionLog`]: session_log::SessionLog
//! [`RobotController`]: controller::RobotController
//! [`SimulationClock`]: clock::SimulationClock
//! [`ObstacleSensor`]: obstacle::ObstacleSensor

pub mod broadcast;
pub mod clock;
pub mod config;
pub mod controller;
pub mod gateway;
pub mod lifecycle;
pub mod obstacle;
pub mod robot;
pub mod session_log;

pub use broadcast::{BroadcastError, Broadcaster, Subscription};
pub use clock::SimulationClock;
pub use config::{CleanbotConfig, ConfigError};
pub use controller::{Rejected, RobotController, StopOutcome, TickReport};
pub use gateway::CommandGateway;
pub use lifecycle::Lifecycle;
pub use obstacle::{ObstacleSensor, RandomObstacleSensor, ScriptedObstacleSensor};
pub use robot::{RobotState, TransitionError};
pub use session_log::{InMemorySessionLog, SessionLog, SessionLogError};
