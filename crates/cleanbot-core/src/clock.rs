//! The periodic simulation driver.
//!
//! [`SimulationClock`] owns the obstacle sensor and calls
//! [`RobotController::tick`] once per interval until shutdown. The tick
//! itself decides whether anything happens; the clock only keeps time.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::controller::{RobotController, TickReport};
use crate::lifecycle::Lifecycle;
use crate::obstacle::{ObstacleSensor, RandomObstacleSensor};

/// Drives the controller on a fixed period.
pub struct SimulationClock {
    controller: RobotController,
    sensor: Box<dyn ObstacleSensor>,
    interval: Duration,
    ticks: u64,
}

impl std::fmt::Debug for SimulationClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationClock")
            .field("interval", &self.interval)
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}

impl SimulationClock {
    /// A clock using the controller's configured interval and a random
    /// sensor built from its configured probability and seed.
    pub fn from_controller(controller: RobotController) -> Self {
        let simulation = controller.simulation();
        let sensor = RandomObstacleSensor::new(simulation.obstacle_probability, simulation.seed);
        let interval = simulation.tick_interval();
        Self::new(controller, Box::new(sensor), interval)
    }

    /// A clock with an explicit sensor and interval.
    pub fn new(
        controller: RobotController,
        sensor: Box<dyn ObstacleSensor>,
        interval: Duration,
    ) -> Self {
        Self {
            controller,
            sensor,
            interval,
            ticks: 0,
        }
    }

    /// Fire once.
    pub async fn tick(&mut self) -> TickReport {
        self.ticks = self.ticks.saturating_add(1);
        self.controller.tick(self.sensor.as_mut()).await
    }

    /// Ticks fired so far.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Tick every interval until `lifecycle` requests shutdown.
    ///
    /// Returns the number of ticks fired.
    pub async fn run(mut self, lifecycle: Arc<Lifecycle>) -> u64 {
        info!(interval = ?self.interval, "Simulation clock starting");

        loop {
            if lifecycle.is_shutting_down() {
                break;
            }

            let report = self.tick().await;
            if report.advanced {
                debug!(tick = self.ticks, progress = report.progress, "Clock tick");
            }

            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                () = lifecycle.wait_for_shutdown() => break,
            }
        }

        info!(ticks = self.ticks, "Simulation clock stopped");
        self.ticks
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cleanbot_types::{CleaningMode, RobotStatus};

    use super::*;
    use crate::config::{BroadcastConfig, SimulationConfig};
    use crate::obstacle::ScriptedObstacleSensor;
    use crate::session_log::{InMemorySessionLog, SessionLog};

    fn controller(step: u8) -> RobotController {
        RobotController::new(
            SimulationConfig {
                progress_step: step,
                ..SimulationConfig::default()
            },
            &BroadcastConfig::default(),
            Arc::new(InMemorySessionLog::new()),
        )
    }

    fn clear_clock(controller: &RobotController) -> SimulationClock {
        SimulationClock::new(
            controller.clone(),
            Box::new(ScriptedObstacleSensor::clear_path()),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn progress_follows_tick_count() {
        let robot = controller(2);
        let mut clock = clear_clock(&robot);
        robot.start(CleaningMode::FullClean).await.unwrap();

        for n in 1..=49_u8 {
            clock.tick().await;
            let state = robot.snapshot().await;
            assert_eq!(state.progress, n.saturating_mul(2));
            assert_eq!(state.status, RobotStatus::phase_for_progress(state.progress));
        }
        assert_eq!(clock.ticks(), 49);

        let report = clock.tick().await;
        assert!(report.completed.is_some());
        assert_eq!(robot.snapshot().await.status, RobotStatus::Idle);
    }

    #[tokio::test]
    async fn threshold_boundaries() {
        let robot = controller(2);
        let mut clock = clear_clock(&robot);
        robot.start(CleaningMode::FullClean).await.unwrap();

        let mut seen = Vec::new();
        for _ in 0..45 {
            clock.tick().await;
            let state = robot.snapshot().await;
            seen.push((state.progress, state.status));
        }
        assert!(seen.contains(&(28, RobotStatus::Mopping)));
        assert!(seen.contains(&(30, RobotStatus::Spraying)));
        assert!(seen.contains(&(58, RobotStatus::Spraying)));
        assert!(seen.contains(&(60, RobotStatus::UvDisinfecting)));
        assert!(seen.contains(&(88, RobotStatus::UvDisinfecting)));
        assert!(seen.contains(&(90, RobotStatus::Mopping)));
    }

    #[tokio::test(start_paused = true)]
    async fn run_ticks_until_shutdown() {
        let robot = controller(2);
        robot.start(CleaningMode::FullClean).await.unwrap();
        let lifecycle = Arc::new(Lifecycle::new());

        let handle = tokio::spawn(clear_clock(&robot).run(Arc::clone(&lifecycle)));
        // Ticks fire at 0s, 5s, 10s and 15s.
        tokio::time::sleep(Duration::from_millis(17_000)).await;
        lifecycle.request_shutdown();

        let ticks = handle.await.unwrap();
        assert_eq!(ticks, 4);
        assert_eq!(robot.snapshot().await.progress, 8);
    }

    #[tokio::test(start_paused = true)]
    async fn full_session_runs_to_completion() {
        let log = Arc::new(InMemorySessionLog::new());
        let robot = RobotController::new(
            SimulationConfig::default(),
            &BroadcastConfig::default(),
            log.clone(),
        );
        robot.start(CleaningMode::FullClean).await.unwrap();
        let lifecycle = Arc::new(Lifecycle::new());

        let clock = SimulationClock::new(
            robot.clone(),
            Box::new(ScriptedObstacleSensor::new([false, false, true])),
            Duration::from_secs(5),
        );
        let handle = tokio::spawn(clock.run(Arc::clone(&lifecycle)));

        tokio::time::sleep(Duration::from_secs(300)).await;
        lifecycle.request_shutdown();
        handle.await.unwrap();

        let state = robot.snapshot().await;
        assert_eq!(state.status, RobotStatus::Idle);
        assert_eq!(state.progress, 100);
        assert_eq!(log.list_recent(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn from_controller_uses_configured_interval() {
        let robot = controller(2);
        let clock = SimulationClock::from_controller(robot);
        assert_eq!(clock.interval, Duration::from_millis(5000));
        assert_eq!(clock.ticks(), 0);
    }
}
