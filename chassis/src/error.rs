//! Toolkit-wide error types
//!
//! Provides a unified error type shared by the logger, repository and server
//! bootstrappers, and converts it to a JSON HTTP response so handlers can
//! propagate it with the `?` operator.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Toolkit-wide error type
///
/// Construction failures (logger, repository, server) are surfaced
/// synchronously through this type; runtime background failures are logged
/// by the owning component instead (see `server`).
#[derive(Debug, Error)]
pub enum ChassisError {
    /// Configuration could not be assembled or validated
    #[error("configuration error: {message}")]
    Config {
        /// What was wrong with the configuration
        message: String,
    },

    /// A logger backend failed to initialize
    #[error("logger initialization failed: {message}")]
    Logger {
        /// The backend's own description of the failure
        message: String,
    },

    /// Database error, converted from the mapping layer
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error from the listener or the runtime
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Server lifecycle error
    #[error("server error: {message}")]
    Server {
        /// What went wrong while managing the server
        message: String,
    },

    /// Graceful shutdown did not finish within the fixed bound
    #[error("server shutdown did not complete within {timeout_secs}s")]
    ShutdownTimeout {
        /// The bound that was exceeded, in seconds
        timeout_secs: u64,
    },
}

impl ChassisError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a logger initialization error
    pub fn logger(message: impl Into<String>) -> Self {
        Self::Logger {
            message: message.into(),
        }
    }

    /// Create a server lifecycle error
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    /// Whether this wraps the mapping layer's record-not-found condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Database(sea_orm::DbErr::RecordNotFound(_)))
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Database(sea_orm::DbErr::RecordNotFound(_)) => 404,
            Self::Config { .. }
            | Self::Logger { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::Server { .. }
            | Self::ShutdownTimeout { .. } => 500,
        }
    }
}

impl IntoResponse for ChassisError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ChassisError::config("bad").status_code(), 500);
        assert_eq!(ChassisError::server("bad").status_code(), 500);
        let not_found =
            ChassisError::from(sea_orm::DbErr::RecordNotFound("note 42".to_string()));
        assert_eq!(not_found.status_code(), 404);
        assert!(not_found.is_not_found());
    }

    #[test]
    fn test_display_carries_message() {
        let err = ChassisError::logger("backend exploded");
        assert_eq!(err.to_string(), "logger initialization failed: backend exploded");
    }
}
