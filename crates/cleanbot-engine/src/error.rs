//! Error types for the controller binary.

/// Top-level error for the controller binary.
///
/// Each variant wraps a startup failure from one subsystem so `main` can
/// propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: cleanbot_core::ConfigError,
    },

    /// The session database could not be opened.
    #[error("database error: {source}")]
    Database {
        /// The underlying database error.
        #[from]
        source: cleanbot_db::DbError,
    },

    /// The HTTP server could not bind or stopped with an error.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: cleanbot_observer::ServerError,
    },

    /// Installing the log subscriber failed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_is_prefixed() {
        let err = EngineError::from(cleanbot_core::ConfigError::Invalid {
            reason: "simulation.tick_interval_ms must be at least 1".to_owned(),
        });
        assert_eq!(
            err.to_string(),
            "config error: invalid configuration: simulation.tick_interval_ms must be at least 1"
        );
    }
}
