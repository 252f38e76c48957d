//! Service layer error types

use warden_core::{DomainError, ErrorKind};

/// Service layer error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Error reported by a repository or the platform
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Configured resource cannot be resolved
    #[error("Configuration error: {0}")]
    Config(String),

    /// The platform refused a required action
    #[error("Missing permission: {0}")]
    Permission(String),

    /// Resource not found
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// Operation exceeded its time budget
    #[error("Timed out: {0}")]
    Timeout(String),
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a permission error
    pub fn permission(msg: impl Into<String>) -> Self {
        Self::Permission(msg.into())
    }

    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(e) => e.kind(),
            Self::Config(_) => ErrorKind::Config,
            Self::Permission(_) => ErrorKind::Permission,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Timeout(_) => ErrorKind::Transient,
        }
    }

    /// Get the error code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::Config(_) => "CONFIG_ERROR",
            Self::Permission(_) => "MISSING_PERMISSIONS",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Timeout(_) => "TIMEOUT",
        }
    }
}
