//! `PostgreSQL` session history for the cleanbot robot controller.
//!
//! Finished sessions are appended to the `cleaning_sessions` table and
//! read back newest first. [`PostgresSessionLog`] plugs this store into
//! the controller through the [`SessionLog`](cleanbot_core::SessionLog)
//! seam.
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool, configuration and migrations
//! - [`session_store`] -- Session record insertion and querying
//! - [`error`] -- Shared error types

pub mod error;
pub mod postgres;
pub mod session_store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool};
pub use session_store::{PostgresSessionLog, SessionRow};
