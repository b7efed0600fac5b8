//! The application context: one robot, its subscribers and its history.
//!
//! [`RobotController`] is a cheap, cloneable handle created once at
//! startup and passed to the simulation clock and the command surface.
//! Every mutation, whether from a command or a tick, funnels through the
//! same state lock.
//!
//! # Ordering
//!
//! Events are published while the state lock is held. Since the
//! broadcaster never blocks, this costs nothing and guarantees that every
//! subscriber sees events in the order the mutations were applied.
//! Subscribing also takes the lock, so the send-on-connect snapshot is
//! exactly the state between two published events.
//!
//! # Session history
//!
//! Records are appended after the lock is released. A failed append is
//! logged and reported to the caller, but the transition that produced the
//! record stands.

use std::sync::Arc;

use chrono::Utc;
use cleanbot_types::{
    CleaningMode, PauseReason, RobotEvent, RobotStateSnapshot, SessionRecord, SubscriberId,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::broadcast::{BroadcastError, Broadcaster, Subscription};
use crate::config::{BroadcastConfig, ObstacleClearMode, SimulationConfig};
use crate::obstacle::ObstacleSensor;
use crate::robot::{RobotState, TransitionError};
use crate::session_log::{SessionLog, SessionLogError, clamp_limit};

const OBSTACLE_ALERT: &str = "Obstacle detected! Robot paused for safety.";
const PATH_CLEAR: &str = "Path clear. Resuming cleaning...";
const SESSION_COMPLETE: &str = "Cleaning cycle completed successfully!";

/// A command that was not valid in the robot's current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct Rejected {
    /// Why the command was refused.
    pub reason: TransitionError,
    /// The unchanged state at the time of the refusal.
    pub state: RobotStateSnapshot,
}

impl Rejected {
    fn new(reason: TransitionError, state: &RobotState) -> Self {
        Self {
            reason,
            state: state.snapshot(),
        }
    }
}

/// Result of an accepted stop.
#[derive(Debug)]
pub struct StopOutcome {
    /// The `Interrupted` record handed to the session log.
    pub record: SessionRecord,
    /// State after the reset to idle.
    pub state: RobotStateSnapshot,
    /// Set if the session log failed to store `record`.
    pub storage_error: Option<SessionLogError>,
}

/// What a single tick did.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Whether progress moved.
    pub advanced: bool,
    /// Progress after the tick.
    pub progress: u8,
    /// Whether this tick detected an obstacle.
    pub obstacle: bool,
    /// The `Completed` record if the session finished on this tick.
    pub completed: Option<SessionRecord>,
    /// Set if the session log failed to store `completed`.
    pub storage_error: Option<SessionLogError>,
}

struct ControllerInner {
    state: Mutex<RobotState>,
    broadcaster: Broadcaster,
    session_log: Arc<dyn SessionLog>,
    simulation: SimulationConfig,
}

/// Shared handle to the robot.
#[derive(Clone)]
pub struct RobotController {
    inner: Arc<ControllerInner>,
}

impl std::fmt::Debug for RobotController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RobotController")
            .field("simulation", &self.inner.simulation)
            .field("subscribers", &self.inner.broadcaster.subscriber_count())
            .finish_non_exhaustive()
    }
}

impl RobotController {
    /// Create the controller with an idle robot and no subscribers.
    pub fn new(
        simulation: SimulationConfig,
        broadcast: &BroadcastConfig,
        session_log: Arc<dyn SessionLog>,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                state: Mutex::new(RobotState::new()),
                broadcaster: Broadcaster::new(broadcast.subscriber_buffer),
                session_log,
                simulation,
            }),
        }
    }

    /// The simulation settings this controller runs with.
    pub fn simulation(&self) -> &SimulationConfig {
        &self.inner.simulation
    }

    /// The subscriber set.
    pub fn broadcaster(&self) -> &Broadcaster {
        &self.inner.broadcaster
    }

    /// A consistent copy of the current state.
    pub async fn snapshot(&self) -> RobotStateSnapshot {
        self.inner.state.lock().await.snapshot()
    }

    // -----------------------------------------------------------------------
    // Subscribers
    // -----------------------------------------------------------------------

    /// Register a subscriber whose first event is the current state.
    pub async fn subscribe(&self) -> Result<Subscription, BroadcastError> {
        let state = self.inner.state.lock().await;
        self.inner.broadcaster.subscribe(RobotEvent::StatusUpdate {
            state: state.snapshot(),
        })
    }

    /// Remove a subscriber. Idempotent.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.inner.broadcaster.unsubscribe(id)
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Start a session in `mode`.
    pub async fn start(&self, mode: CleaningMode) -> Result<RobotStateSnapshot, Rejected> {
        let mut state = self.inner.state.lock().await;
        let session_id = state
            .start(mode, Utc::now())
            .map_err(|reason| Rejected::new(reason, &state))?;

        info!(%session_id, mode = mode.as_str(), "Cleaning session started");
        Ok(self.publish_info(format!("Starting {} cycle...", mode.label()), &state))
    }

    /// End the running session early and log it as interrupted.
    ///
    /// A storage failure does not undo the stop; it is reported in
    /// [`StopOutcome::storage_error`].
    pub async fn stop(&self) -> Result<StopOutcome, Rejected> {
        let (record, snapshot) = {
            let mut state = self.inner.state.lock().await;
            let record = state
                .stop(Utc::now())
                .map_err(|reason| Rejected::new(reason, &state))?;

            info!(
                session_id = %record.id,
                progress = record.final_progress,
                duration = record.duration,
                "Cleaning session stopped"
            );
            let snapshot = self.publish_info("Cleaning stopped by user", &state);
            (record, snapshot)
        };

        let storage_error = self.persist(&record).await.err();
        Ok(StopOutcome {
            record,
            state: snapshot,
            storage_error,
        })
    }

    /// Pause the running session.
    ///
    /// An obstacle pause schedules its own auto-clear after the grace
    /// interval.
    pub async fn pause(&self, reason: PauseReason) -> Result<RobotStateSnapshot, Rejected> {
        let mut state = self.inner.state.lock().await;
        state
            .pause(reason)
            .map_err(|cause| Rejected::new(cause, &state))?;

        let snapshot = self.announce_pause(&state, reason);
        if reason == PauseReason::ObstacleDetected {
            self.schedule_obstacle_clear(state.obstacle_seq());
        }
        Ok(snapshot)
    }

    /// Resume a paused session in the mopping phase.
    pub async fn resume(&self) -> Result<RobotStateSnapshot, Rejected> {
        let mut state = self.inner.state.lock().await;
        state
            .resume()
            .map_err(|reason| Rejected::new(reason, &state))?;

        info!(progress = state.progress(), "Cleaning resumed");
        Ok(self.publish_info("Cleaning resumed", &state))
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance the simulation by one tick.
    ///
    /// Does nothing unless a session is running. Otherwise adds one
    /// progress step, consults `sensor` for an obstacle, publishes a
    /// snapshot and finalizes the session if it reached 100%.
    pub async fn tick(&self, sensor: &mut dyn ObstacleSensor) -> TickReport {
        let mut report = TickReport::default();
        let mut state = self.inner.state.lock().await;
        if !state.is_running() {
            return report;
        }

        report.advanced = state.advance(self.inner.simulation.progress_step);

        if report.advanced
            && sensor.detect()
            && state.pause(PauseReason::ObstacleDetected).is_ok()
        {
            report.obstacle = true;
            let seq = state.obstacle_seq();
            self.announce_pause(&state, PauseReason::ObstacleDetected);

            match self.inner.simulation.obstacle_clear_mode {
                ObstacleClearMode::Detached => self.schedule_obstacle_clear(seq),
                ObstacleClearMode::Inline => {
                    let session_id = state.session_id();
                    drop(state);
                    tokio::time::sleep(self.inner.simulation.obstacle_grace()).await;
                    state = self.inner.state.lock().await;

                    if state.session_id() != session_id {
                        debug!("Session ended during obstacle grace, abandoning tick");
                        report.progress = state.progress();
                        return report;
                    }
                    self.clear_obstacle_locked(&mut state, seq);
                }
            }
        }

        report.progress = state.progress();
        debug!(
            progress = state.progress(),
            status = ?state.status(),
            "Tick"
        );
        self.publish(&RobotEvent::StatusUpdate {
            state: state.snapshot(),
        });

        let Some(record) = state.complete(Utc::now()) else {
            return report;
        };
        info!(
            session_id = %record.id,
            duration = record.duration,
            "Cleaning session completed"
        );
        self.publish(&RobotEvent::CleaningComplete {
            message: SESSION_COMPLETE.to_owned(),
            state: state.snapshot(),
            duration: record.duration,
        });
        drop(state);

        report.storage_error = self.persist(&record).await.err();
        report.completed = Some(record);
        report
    }

    // -----------------------------------------------------------------------
    // History and lifecycle
    // -----------------------------------------------------------------------

    /// The most recent sessions, newest first.
    ///
    /// `limit` defaults to 100 and is clamped to `1..=100`.
    pub async fn recent_sessions(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<SessionRecord>, SessionLogError> {
        self.inner
            .session_log
            .list_recent(clamp_limit(limit))
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to list cleaning sessions"))
    }

    /// Refuse new subscribers, end every subscription and close the log.
    pub async fn shutdown(&self) {
        self.inner.broadcaster.close();
        self.inner.session_log.close().await;
        info!("Robot controller shut down");
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn publish(&self, event: &RobotEvent) {
        let receivers = self.inner.broadcaster.publish(event);
        debug!(event = event.kind(), receivers, "Event published");
    }

    fn publish_info(&self, message: impl Into<String>, state: &RobotState) -> RobotStateSnapshot {
        let snapshot = state.snapshot();
        self.publish(&RobotEvent::Info {
            message: message.into(),
            state: snapshot.clone(),
        });
        snapshot
    }

    fn announce_pause(&self, state: &RobotState, reason: PauseReason) -> RobotStateSnapshot {
        match reason {
            PauseReason::UserRequest => {
                info!(progress = state.progress(), "Cleaning paused by user");
                self.publish_info("Cleaning paused by user", state)
            }
            PauseReason::ObstacleDetected => {
                warn!(progress = state.progress(), "Obstacle detected, pausing");
                let snapshot = state.snapshot();
                self.publish(&RobotEvent::Alert {
                    message: OBSTACLE_ALERT.to_owned(),
                    state: snapshot.clone(),
                });
                snapshot
            }
        }
    }

    fn schedule_obstacle_clear(&self, seq: u64) {
        let controller = self.clone();
        let grace = self.inner.simulation.obstacle_grace();
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let mut state = controller.inner.state.lock().await;
            controller.clear_obstacle_locked(&mut state, seq);
        });
    }

    fn clear_obstacle_locked(&self, state: &mut RobotState, seq: u64) -> bool {
        if !state.clear_obstacle(seq) {
            debug!(seq, "Obstacle pause already ended, nothing to clear");
            return false;
        }
        info!(
            progress = state.progress(),
            status = ?state.status(),
            "Obstacle cleared"
        );
        self.publish_info(PATH_CLEAR, state);
        true
    }

    async fn persist(&self, record: &SessionRecord) -> Result<(), SessionLogError> {
        self.inner
            .session_log
            .append(record)
            .await
            .inspect(|()| debug!(session_id = %record.id, "Cleaning session recorded"))
            .inspect_err(|e| {
                warn!(
                    session_id = %record.id,
                    error = %e,
                    "Failed to record cleaning session"
                );
            })
    }
}
