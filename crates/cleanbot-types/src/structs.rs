//! Snapshot and history record structs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{CleaningMode, PauseReason, RobotStatus, SessionOutcome};
use crate::ids::SessionId;

/// A full copy of the robot's state at one point in time.
///
/// Carried by every outbound event and by the status endpoint. The
/// controller never hands out references to its live state; observers
/// only ever see snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RobotStateSnapshot {
    /// Current operational status.
    pub status: RobotStatus,
    /// Session progress in percent (0-100).
    pub progress: u8,
    /// Whether a session is active (including while paused).
    pub is_cleaning: bool,
    /// Whether an obstacle pause is in effect.
    pub obstacle_detected: bool,
    /// When the running session started (RFC 3339), if any.
    pub start_time: Option<DateTime<Utc>>,
    /// Mode of the running session, if any.
    pub current_mode: Option<CleaningMode>,
    /// Why the session is paused, if it is.
    pub pause_reason: Option<PauseReason>,
}

/// One finished cleaning session, as written to the session log.
///
/// Created exactly once per session, at natural completion or on a stop
/// command, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SessionRecord {
    /// Session identifier, assigned when the session started.
    pub id: SessionId,
    /// When the session started.
    pub start_time: DateTime<Utc>,
    /// When the session ended.
    pub end_time: DateTime<Utc>,
    /// Whole seconds between start and end.
    pub duration: u64,
    /// The mode the session ran in.
    pub mode: CleaningMode,
    /// Whether the session completed or was interrupted.
    pub outcome: SessionOutcome,
    /// Progress at the moment the session ended.
    pub final_progress: u8,
}

/// Whole seconds elapsed between two instants, clamped at zero.
pub fn elapsed_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    let secs = end.signed_duration_since(start).num_seconds();
    u64::try_from(secs.max(0)).unwrap_or(0)
}
