//! Controller binary for the cleanbot robot.
//!
//! Wires the state machine, simulation clock, session storage and the
//! HTTP/WebSocket server together, then runs until Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `cleanbot-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Open session storage (`PostgreSQL` when configured, else in-memory)
//! 4. Create the controller and shared lifecycle
//! 5. Start the HTTP server
//! 6. Start the simulation clock
//! 7. Wait for Ctrl-C, then drain everything in order

mod error;

use std::path::Path;
use std::sync::Arc;

use cleanbot_core::config::{LogFormat, LoggingConfig};
use cleanbot_core::{
    CleanbotConfig, InMemorySessionLog, Lifecycle, RobotController, SessionLog, SimulationClock,
};
use cleanbot_db::{PostgresPool, PostgresSessionLog};
use cleanbot_observer::{AppState, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "cleanbot-config.yaml";

/// Application entry point for the controller.
///
/// # Errors
///
/// Returns an error if configuration, storage or the server fails to
/// come up.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging)?;
    info!(
        tick_interval_ms = config.simulation.tick_interval_ms,
        progress_step = config.simulation.progress_step,
        obstacle_probability = config.simulation.obstacle_probability,
        clear_mode = ?config.simulation.obstacle_clear_mode,
        "cleanbot-engine starting"
    );

    // 3. Open session storage.
    let session_log = open_session_log(config.infrastructure.postgres_url.as_deref()).await?;

    // 4. Create the controller.
    let controller = RobotController::new(
        config.simulation.clone(),
        &config.broadcast,
        session_log,
    );
    let lifecycle = Arc::new(Lifecycle::new());
    let app_state = Arc::new(AppState::new(controller.clone(), Arc::clone(&lifecycle)));

    // 5. Start the HTTP server.
    let server_config = ServerConfig::from(&config.infrastructure);
    let server = cleanbot_observer::spawn_observer(&server_config, app_state).await?;

    // 6. Start the simulation clock.
    let clock = tokio::spawn(
        SimulationClock::from_controller(controller.clone()).run(Arc::clone(&lifecycle)),
    );

    // 7. Wait for Ctrl-C.
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C, shutting down");
    }
    info!("Shutdown requested");
    lifecycle.request_shutdown();

    match clock.await {
        Ok(ticks) => info!(ticks, "Simulation clock stopped"),
        Err(e) => tracing::error!(error = %e, "Simulation clock task failed"),
    }
    // Ends every WebSocket stream so the server can drain.
    controller.broadcaster().close();
    if let Err(e) = server.await {
        tracing::error!(error = %e, "Server task failed");
    }
    controller.shutdown().await;

    info!("cleanbot-engine shutdown complete");
    Ok(())
}

/// Load `cleanbot-config.yaml`, falling back to defaults when it is absent.
///
/// Environment overrides apply in both cases.
fn load_config() -> Result<CleanbotConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        return Ok(CleanbotConfig::from_file(config_path)?);
    }
    let mut config = CleanbotConfig::default();
    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| EngineError::Logging {
            message: format!("invalid log level `{}`: {e}", logging.level),
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = match logging.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| EngineError::Logging {
        message: e.to_string(),
    })
}

/// `PostgreSQL` when a URL is configured, otherwise an in-memory log that
/// lives as long as the process.
async fn open_session_log(postgres_url: Option<&str>) -> Result<Arc<dyn SessionLog>, EngineError> {
    if let Some(url) = postgres_url {
        let pool = PostgresPool::open(url).await?;
        info!("Session history stored in PostgreSQL");
        return Ok(Arc::new(PostgresSessionLog::new(pool)));
    }
    tracing::warn!("No database configured, session history will not survive a restart");
    Ok(Arc::new(InMemorySessionLog::new()))
}
