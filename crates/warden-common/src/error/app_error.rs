//! Application error types
//!
//! Errors that abort startup or the process as a whole. Per-event failures
//! are handled by the services and never reach this type.

use warden_core::{DomainError, ErrorKind};

use crate::config::ConfigError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    // Discord connection errors
    #[error("Gateway error: {0}")]
    Gateway(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(#[source] anyhow::Error),
}

/// Result alias for application-level operations
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Get an error code for logs
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Gateway(_) => "GATEWAY_ERROR",
            Self::Domain(e) => e.code(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether restarting the process could plausibly succeed
    ///
    /// Configuration problems need an operator; everything else may clear up.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Config(_) => false,
            Self::Domain(e) => e.kind() == ErrorKind::Transient,
            Self::Database(_) | Self::Gateway(_) | Self::Internal(_) => true,
        }
    }

    /// Create a database error
    pub fn database(msg: impl std::fmt::Display) -> Self {
        Self::Database(msg.to_string())
    }

    /// Create a gateway error
    pub fn gateway(msg: impl std::fmt::Display) -> Self {
        Self::Gateway(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}
