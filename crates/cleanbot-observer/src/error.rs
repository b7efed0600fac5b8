//! Error types for the HTTP surface.
//!
//! [`ObserverError`] can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. A refused
//! robot command is not an error and never passes through here.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cleanbot_core::SessionLogError;

/// Errors that can occur in the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// Session history could not be read.
    #[error("{0}")]
    Storage(#[from] SessionLogError),

    /// The server is shutting down.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl ObserverError {
    /// The HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Storage(_) | Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_failure_is_503() {
        let err = ObserverError::from(SessionLogError::StorageUnavailable("down".to_owned()));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "session storage unavailable: down");
    }

    #[test]
    fn shutting_down_is_503() {
        let response = ObserverError::Unavailable("shutting down".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
