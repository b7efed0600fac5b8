//! The robot's operational state machine.
//!
//! [`RobotState`] is a plain synchronous value: it validates and applies
//! transitions but knows nothing about locking, timers or subscribers.
//! The [`RobotController`](crate::controller::RobotController) owns the
//! single instance behind a mutex and turns each applied transition into
//! a broadcast event.
//!
//! ```text
//! Idle --start--> Mopping/Spraying/UvDisinfecting --pause--> Paused
//!  ^                 |          ^                              |
//!  |                 |          +-----------resume-------------+
//!  +--stop/complete--+
//! ```
//!
//! The running session's start time, mode and identifier live together in
//! one `Option`, so "mode and start time are set iff a session is active"
//! holds by construction.

use chrono::{DateTime, Utc};
use cleanbot_types::{
    CleaningMode, PauseReason, RobotStateSnapshot, RobotStatus, SessionId, SessionOutcome,
    SessionRecord, elapsed_seconds,
};

/// Progress value at which a session is finished.
pub const PROGRESS_COMPLETE: u8 = 100;

/// A transition that is not valid in the current state.
///
/// These are ordinary outcomes, reported back to the caller as a
/// rejected command rather than treated as faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// `start` while a session is already running.
    #[error("Robot is already cleaning")]
    AlreadyCleaning,

    /// `stop` with no running session.
    #[error("Robot is not cleaning")]
    NotCleaning,

    /// `pause` with no running session, or while already paused.
    #[error("Cannot pause robot")]
    CannotPause,

    /// `resume` unless the running session is paused.
    #[error("Cannot resume robot")]
    CannotResume,
}

/// Identity of the running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveSession {
    id: SessionId,
    start_time: DateTime<Utc>,
    mode: CleaningMode,
}

/// The robot's mutable operational state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotState {
    status: RobotStatus,
    progress: u8,
    obstacle_detected: bool,
    pause_reason: Option<PauseReason>,
    session: Option<ActiveSession>,
    /// Incremented on every obstacle pause so a stale auto-clear timer
    /// can recognise that the pause it was scheduled for is gone.
    obstacle_seq: u64,
}

impl RobotState {
    /// A fresh idle robot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current operational status.
    pub const fn status(&self) -> RobotStatus {
        self.status
    }

    /// Session progress in percent.
    pub const fn progress(&self) -> u8 {
        self.progress
    }

    /// Whether a session is active (including while paused).
    pub const fn is_cleaning(&self) -> bool {
        self.session.is_some()
    }

    /// Whether a session is active and not paused.
    pub fn is_running(&self) -> bool {
        self.is_cleaning() && self.status != RobotStatus::Paused
    }

    /// Whether an obstacle pause is in effect.
    pub const fn obstacle_detected(&self) -> bool {
        self.obstacle_detected
    }

    /// Why the session is paused, if it is.
    pub const fn pause_reason(&self) -> Option<PauseReason> {
        self.pause_reason
    }

    /// Identifier of the running session.
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.map(|s| s.id)
    }

    /// Mode of the running session.
    pub fn current_mode(&self) -> Option<CleaningMode> {
        self.session.map(|s| s.mode)
    }

    /// Start time of the running session.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.session.map(|s| s.start_time)
    }

    /// Sequence number of the most recent obstacle pause.
    pub const fn obstacle_seq(&self) -> u64 {
        self.obstacle_seq
    }

    /// A full copy of the observable fields.
    pub fn snapshot(&self) -> RobotStateSnapshot {
        RobotStateSnapshot {
            status: self.status,
            progress: self.progress,
            is_cleaning: self.is_cleaning(),
            obstacle_detected: self.obstacle_detected,
            start_time: self.start_time(),
            current_mode: self.current_mode(),
            pause_reason: self.pause_reason,
        }
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Begin a new session in the mopping phase at 0% progress.
    pub fn start(
        &mut self,
        mode: CleaningMode,
        now: DateTime<Utc>,
    ) -> Result<SessionId, TransitionError> {
        if self.is_cleaning() {
            return Err(TransitionError::AlreadyCleaning);
        }
        let id = SessionId::new();
        self.session = Some(ActiveSession {
            id,
            start_time: now,
            mode,
        });
        self.status = RobotStatus::Mopping;
        self.progress = 0;
        self.obstacle_detected = false;
        self.pause_reason = None;
        Ok(id)
    }

    /// End the running session early and reset to idle with 0% progress.
    ///
    /// Returns the `Interrupted` record carrying the progress at stop time.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<SessionRecord, TransitionError> {
        let session = self.session.ok_or(TransitionError::NotCleaning)?;
        let record = self.record(session, now, SessionOutcome::Interrupted);
        self.reset_to_idle();
        self.progress = 0;
        Ok(record)
    }

    /// Suspend the running session.
    ///
    /// An obstacle pause also raises `obstacle_detected` and bumps the
    /// obstacle sequence number.
    pub fn pause(&mut self, reason: PauseReason) -> Result<(), TransitionError> {
        if !self.is_running() {
            return Err(TransitionError::CannotPause);
        }
        self.status = RobotStatus::Paused;
        self.pause_reason = Some(reason);
        if reason == PauseReason::ObstacleDetected {
            self.obstacle_detected = true;
            self.obstacle_seq = self.obstacle_seq.wrapping_add(1);
        }
        Ok(())
    }

    /// Continue a paused session.
    ///
    /// Always re-enters the mopping phase; the next tick re-derives the
    /// phase from progress.
    pub fn resume(&mut self) -> Result<(), TransitionError> {
        if !self.is_cleaning() || self.status != RobotStatus::Paused {
            return Err(TransitionError::CannotResume);
        }
        self.status = RobotStatus::Mopping;
        self.pause_reason = None;
        self.obstacle_detected = false;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tick-driven transitions
    // -----------------------------------------------------------------------

    /// Add `step` percent of progress and re-derive the phase.
    ///
    /// Does nothing unless the session is running and below 100%.
    /// Returns whether progress changed.
    pub fn advance(&mut self, step: u8) -> bool {
        if !self.is_running() || self.progress >= PROGRESS_COMPLETE {
            return false;
        }
        self.progress = self.progress.saturating_add(step).min(PROGRESS_COMPLETE);
        self.status = RobotStatus::phase_for_progress(self.progress);
        true
    }

    /// Clear the obstacle pause numbered `seq`, restoring the phase for the
    /// current progress.
    ///
    /// Returns `false` (and changes nothing) if that pause already ended,
    /// whether through a user resume, a stop, or a newer obstacle.
    pub fn clear_obstacle(&mut self, seq: u64) -> bool {
        let still_blocked = self.is_cleaning()
            && self.status == RobotStatus::Paused
            && self.pause_reason == Some(PauseReason::ObstacleDetected)
            && self.obstacle_seq == seq;
        if !still_blocked {
            return false;
        }
        self.obstacle_detected = false;
        self.pause_reason = None;
        self.status = RobotStatus::phase_for_progress(self.progress);
        true
    }

    /// Whether the running session has reached 100% and is not paused.
    pub fn is_finished(&self) -> bool {
        self.is_running() && self.progress >= PROGRESS_COMPLETE
    }

    /// Finalize a finished session as `Completed` and reset to idle.
    ///
    /// Progress stays at 100 until the next start. Returns `None` if the
    /// session is not finished.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Option<SessionRecord> {
        if !self.is_finished() {
            return None;
        }
        let session = self.session?;
        let record = self.record(session, now, SessionOutcome::Completed);
        self.reset_to_idle();
        Some(record)
    }

    fn record(
        &self,
        session: ActiveSession,
        now: DateTime<Utc>,
        outcome: SessionOutcome,
    ) -> SessionRecord {
        SessionRecord {
            id: session.id,
            start_time: session.start_time,
            end_time: now,
            duration: elapsed_seconds(session.start_time, now),
            mode: session.mode,
            outcome,
            final_progress: self.progress,
        }
    }

    fn reset_to_idle(&mut self) {
        self.session = None;
        self.status = RobotStatus::Idle;
        self.obstacle_detected = false;
        self.pause_reason = None;
    }
}
