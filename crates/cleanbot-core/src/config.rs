//! Configuration loading and typed config structures for the robot controller.
//!
//! The canonical configuration lives in `cleanbot-config.yaml` in the
//! working directory. Every field has a default, so a missing file or an
//! empty document yields a fully usable configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value was parsed but is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level controller configuration.
///
/// Mirrors the structure of `cleanbot-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CleanbotConfig {
    /// Tick cadence, progress step and obstacle behavior.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Push-channel settings.
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Database URL and listen address.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CleanbotConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `DATABASE_URL` overrides `infrastructure.postgres_url`
    /// - `OBSERVER_PORT` overrides `infrastructure.observer_port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse_yaml(&contents)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// Unlike [`from_file`](Self::from_file) this does not consult the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config = Self::parse_yaml(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn parse_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `OBSERVER_PORT` is not a port number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_env_overrides_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides using an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `OBSERVER_PORT` is not a port number.
    pub fn apply_env_overrides_with(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("DATABASE_URL") {
            self.infrastructure.postgres_url = Some(url);
        }
        if let Some(port) = lookup("OBSERVER_PORT") {
            self.infrastructure.observer_port =
                port.parse().map_err(|e| ConfigError::Invalid {
                    reason: format!("OBSERVER_PORT={port}: {e}"),
                })?;
        }
        Ok(())
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if sim.tick_interval_ms == 0 {
            return Err(invalid("simulation.tick_interval_ms must be at least 1"));
        }
        if sim.progress_step == 0 || sim.progress_step > 100 {
            return Err(invalid("simulation.progress_step must be within 1..=100"));
        }
        if !(0.0..=1.0).contains(&sim.obstacle_probability) {
            return Err(invalid(
                "simulation.obstacle_probability must be within 0.0..=1.0",
            ));
        }
        if self.broadcast.subscriber_buffer == 0 {
            return Err(invalid("broadcast.subscriber_buffer must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// How an obstacle pause is cleared after the grace interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleClearMode {
    /// A one-shot timer task clears the obstacle; the tick cadence is unaffected.
    #[default]
    Detached,
    /// The tick waits out the grace interval itself (without holding the
    /// state lock), delaying the next regular tick.
    Inline,
}

/// Tick cadence, progress step and obstacle behavior.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Real-time milliseconds per tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Percent of progress added per tick.
    #[serde(default = "default_progress_step")]
    pub progress_step: u8,

    /// Chance per advancing tick that an obstacle is detected.
    #[serde(default = "default_obstacle_probability")]
    pub obstacle_probability: f64,

    /// Milliseconds an obstacle pause lasts before auto-clearing.
    #[serde(default = "default_obstacle_grace_ms")]
    pub obstacle_grace_ms: u64,

    /// How the obstacle pause is cleared.
    #[serde(default)]
    pub obstacle_clear_mode: ObstacleClearMode,

    /// Seed for the obstacle RNG. Unset means seeded from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SimulationConfig {
    /// The tick period as a [`Duration`].
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// The obstacle grace interval as a [`Duration`].
    pub const fn obstacle_grace(&self) -> Duration {
        Duration::from_millis(self.obstacle_grace_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            progress_step: default_progress_step(),
            obstacle_probability: default_obstacle_probability(),
            obstacle_grace_ms: default_obstacle_grace_ms(),
            obstacle_clear_mode: ObstacleClearMode::default(),
            seed: None,
        }
    }
}

/// Push-channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BroadcastConfig {
    /// Events queued per subscriber before it is evicted as too slow.
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            subscriber_buffer: default_subscriber_buffer(),
        }
    }
}

/// Database URL and listen address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// `PostgreSQL` connection string. When unset, session history is kept
    /// in memory only.
    #[serde(default)]
    pub postgres_url: Option<String>,

    /// Address the HTTP server binds to.
    #[serde(default = "default_observer_host")]
    pub observer_host: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_observer_port")]
    pub observer_port: u16,
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            postgres_url: None,
            observer_host: default_observer_host(),
            observer_port: default_observer_port(),
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Line format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

const fn default_tick_interval_ms() -> u64 {
    5000
}

const fn default_progress_step() -> u8 {
    2
}

const fn default_obstacle_probability() -> f64 {
    0.1
}

const fn default_obstacle_grace_ms() -> u64 {
    3000
}

const fn default_subscriber_buffer() -> usize {
    64
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8001
}

fn default_log_level() -> String {
    "info".to_owned()
}
