//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`], which wraps the underlying
//! [`sqlx`] errors. At the [`SessionLog`](cleanbot_core::SessionLog) seam
//! every variant collapses into
//! [`SessionLogError::StorageUnavailable`].

use cleanbot_core::SessionLogError;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row does not describe a valid session.
    #[error("Invalid session row: {0}")]
    InvalidRow(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<DbError> for SessionLogError {
    fn from(err: DbError) -> Self {
        Self::StorageUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_storage_unavailable() {
        let err: SessionLogError = DbError::Config("bad url".to_owned()).into();
        assert_eq!(
            err,
            SessionLogError::StorageUnavailable("Configuration error: bad url".to_owned())
        );
    }

    #[test]
    fn row_errors_name_the_problem() {
        let err = DbError::InvalidRow("unknown mode `turbo`".to_owned());
        assert_eq!(err.to_string(), "Invalid session row: unknown mode `turbo`");
    }
}
