//! Platform trait - the membership oracle and action surface of the chat platform
//!
//! Implementations classify every failure into a [`DomainError`] so callers
//! dispatch on [`crate::ErrorKind`] instead of client-library error types:
//! a vanished resource is one of the `*NotFound` variants, a refused action
//! is `Forbidden`, and anything else (timeouts, rate limits, 5xx) is `Transient`.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::entities::{Channel, Guild, Member, Message, OutgoingMessage, Role};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, DomainError>;

#[async_trait]
pub trait Platform: Send + Sync {
    /// Resolve a guild
    async fn resolve_guild(&self, guild_id: Snowflake) -> PlatformResult<Guild>;

    /// Resolve a channel within a guild
    async fn resolve_channel(
        &self,
        guild_id: Snowflake,
        channel_id: Snowflake,
    ) -> PlatformResult<Channel>;

    /// Resolve a role within a guild
    async fn resolve_role(&self, guild_id: Snowflake, role_id: Snowflake) -> PlatformResult<Role>;

    /// Fetch a message; `MessageNotFound` if it was deleted
    async fn fetch_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> PlatformResult<Message>;

    /// IDs of the non-bot users who reacted with `emoji`
    async fn reaction_users(
        &self,
        message: &Message,
        emoji: &str,
    ) -> PlatformResult<HashSet<Snowflake>>;

    /// IDs of the current members holding a role
    async fn role_members(&self, role: &Role) -> PlatformResult<HashSet<Snowflake>>;

    /// Look up a member; `None` if the user is not in the guild
    async fn find_member(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> PlatformResult<Option<Member>>;

    /// Grant a role to a member
    async fn grant_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> PlatformResult<()>;

    /// Revoke a role from a member
    async fn revoke_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> PlatformResult<()>;

    /// Post a message, returning the created message
    async fn post_message(
        &self,
        channel_id: Snowflake,
        message: &OutgoingMessage,
    ) -> PlatformResult<Message>;

    /// Add the bot's own reaction to a message
    async fn add_reaction(&self, message: &Message, emoji: &str) -> PlatformResult<()>;

    /// Delete a message the bot posted
    async fn delete_message(&self, message: &Message) -> PlatformResult<()>;
}
