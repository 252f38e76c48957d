//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Coarse error classification the services dispatch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Required ID/role/channel is unresolvable; a deployment problem
    Config,
    /// Referenced resource no longer exists
    NotFound,
    /// The platform refused the action
    Permission,
    /// Network, rate limit, database or anything unexpected
    Transient,
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Guild not found: {0}")]
    GuildNotFound(Snowflake),

    #[error("Channel not found: {0}")]
    ChannelNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("Role not found: {0}")]
    RoleNotFound(Snowflake),

    #[error("Member not found: {0}")]
    MemberNotFound(Snowflake),

    #[error("User {0} is not blacklisted")]
    BanNotFound(Snowflake),

    #[error("No pending activity check in guild {0}")]
    NoPendingCheck(Snowflake),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Forbidden: {0}")]
    Forbidden(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Transient platform error: {0}")]
    Transient(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl DomainError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::GuildNotFound(_)
            | Self::ChannelNotFound(_)
            | Self::MessageNotFound(_)
            | Self::RoleNotFound(_)
            | Self::MemberNotFound(_)
            | Self::BanNotFound(_)
            | Self::NoPendingCheck(_) => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Permission,
            Self::Configuration(_) => ErrorKind::Config,
            Self::Transient(_) | Self::DatabaseError(_) => ErrorKind::Transient,
        }
    }

    /// Get an error code string for logs and operator feedback
    pub fn code(&self) -> &'static str {
        match self {
            Self::GuildNotFound(_) => "UNKNOWN_GUILD",
            Self::ChannelNotFound(_) => "UNKNOWN_CHANNEL",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::RoleNotFound(_) => "UNKNOWN_ROLE",
            Self::MemberNotFound(_) => "UNKNOWN_MEMBER",
            Self::BanNotFound(_) => "UNKNOWN_BAN",
            Self::NoPendingCheck(_) => "NO_PENDING_CHECK",
            Self::Forbidden(_) => "MISSING_PERMISSIONS",
            Self::Configuration(_) => "CONFIG_ERROR",
            Self::Transient(_) => "TRANSIENT_ERROR",
            Self::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this is a permission error
    pub fn is_forbidden(&self) -> bool {
        self.kind() == ErrorKind::Permission
    }

    /// Check if this is a transient error
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}
