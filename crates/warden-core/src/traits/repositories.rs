//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Every operation touches a single key.

use async_trait::async_trait;

use crate::entities::{BanEntry, PendingCheck};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Ban Repository
// ============================================================================

#[async_trait]
pub trait BanRepository: Send + Sync {
    /// Get the ban entry for a user
    async fn find(&self, user_id: Snowflake) -> RepoResult<Option<BanEntry>>;

    /// Insert or overwrite the entry for `entry.user_id`
    async fn upsert(&self, entry: &BanEntry) -> RepoResult<()>;

    /// Remove a ban; returns whether an entry existed
    async fn delete(&self, user_id: Snowflake) -> RepoResult<bool>;

    /// List all bans, newest first
    async fn list(&self) -> RepoResult<Vec<BanEntry>>;
}

// ============================================================================
// Pending Check Repository
// ============================================================================

#[async_trait]
pub trait PendingCheckRepository: Send + Sync {
    /// Record a new pending check
    async fn create(&self, check: &PendingCheck) -> RepoResult<()>;

    /// Find a pending check by announcement message ID
    async fn find(&self, message_id: Snowflake) -> RepoResult<Option<PendingCheck>>;

    /// All checks with `started_at <= cutoff`
    async fn list_overdue(&self, cutoff: i64) -> RepoResult<Vec<PendingCheck>>;

    /// The most recently started check of a guild
    async fn latest_for_guild(&self, guild_id: Snowflake) -> RepoResult<Option<PendingCheck>>;

    /// Remove a pending check; returns whether it existed
    async fn delete(&self, message_id: Snowflake) -> RepoResult<bool>;
}
