//! Obstacle sources consulted once per advancing tick.
//!
//! The [`ObstacleSensor`] trait abstracts where obstacle events come from:
//! a seeded random roll in production, a fixed script in scenario tests.
//! The simulation clock owns its sensor and lends it to each tick.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of obstacle events.
pub trait ObstacleSensor: Send {
    /// Report whether an obstacle is in the robot's path this tick.
    fn detect(&mut self) -> bool;
}

/// Rolls an obstacle with a fixed probability per call.
#[derive(Debug)]
pub struct RandomObstacleSensor {
    rng: StdRng,
    probability: f64,
}

impl RandomObstacleSensor {
    /// Create a sensor with the given per-tick probability.
    ///
    /// With `Some(seed)` the sequence of rolls is reproducible; with
    /// `None` the RNG is seeded from the operating system. The
    /// probability is clamped to `0.0..=1.0`.
    pub fn new(probability: f64, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            rng,
            probability: probability.clamp(0.0, 1.0),
        }
    }

    /// The configured per-tick probability.
    pub const fn probability(&self) -> f64 {
        self.probability
    }
}

impl ObstacleSensor for RandomObstacleSensor {
    fn detect(&mut self) -> bool {
        self.rng.random::<f64>() < self.probability
    }
}

/// Replays a fixed sequence of rolls, then reports no obstacles.
#[derive(Debug, Clone, Default)]
pub struct ScriptedObstacleSensor {
    script: VecDeque<bool>,
}

impl ScriptedObstacleSensor {
    /// Create a sensor that answers with `rolls` in order.
    pub fn new(rolls: impl IntoIterator<Item = bool>) -> Self {
        Self {
            script: rolls.into_iter().collect(),
        }
    }

    /// A sensor that never detects anything.
    pub fn clear_path() -> Self {
        Self::default()
    }

    /// Rolls not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ObstacleSensor for ScriptedObstacleSensor {
    fn detect(&mut self) -> bool {
        self.script.pop_front().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_probability_never_fires() {
        let mut sensor = RandomObstacleSensor::new(0.0, Some(1));
        assert!((0..1000).all(|_| !sensor.detect()));
    }

    #[test]
    fn certain_probability_always_fires() {
        let mut sensor = RandomObstacleSensor::new(1.0, Some(1));
        assert!((0..1000).all(|_| sensor.detect()));
    }

    #[test]
    fn seeded_rolls_are_reproducible() {
        let mut a = RandomObstacleSensor::new(0.1, Some(42));
        let mut b = RandomObstacleSensor::new(0.1, Some(42));
        let rolls_a: Vec<bool> = (0..200).map(|_| a.detect()).collect();
        let rolls_b: Vec<bool> = (0..200).map(|_| b.detect()).collect();
        assert_eq!(rolls_a, rolls_b);
    }

    #[test]
    fn ten_percent_is_roughly_ten_percent() {
        let mut sensor = RandomObstacleSensor::new(0.1, Some(7));
        let hits = (0..10_000).filter(|_| sensor.detect()).count();
        assert!((700..1300).contains(&hits), "hits = {hits}");
    }

    #[test]
    fn probability_is_clamped() {
        assert!((RandomObstacleSensor::new(3.0, Some(0)).probability() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn script_then_clear() {
        let mut sensor = ScriptedObstacleSensor::new([false, true]);
        assert!(!sensor.detect());
        assert!(sensor.detect());
        assert_eq!(sensor.remaining(), 0);
        assert!(!sensor.detect());
        assert!(!ScriptedObstacleSensor::clear_path().detect());
    }
}
