//! Pending activity check - an announcement awaiting evaluation

use crate::value_objects::Snowflake;

/// Pending activity check, keyed by the announcement message ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCheck {
    pub message_id: Snowflake,
    pub guild_id: Snowflake,
    pub channel_id: Snowflake,
    pub role_id: Snowflake,
    /// Seconds since the Unix epoch
    pub started_at: i64,
}

impl PendingCheck {
    /// Create a new PendingCheck
    pub fn new(
        message_id: Snowflake,
        guild_id: Snowflake,
        channel_id: Snowflake,
        role_id: Snowflake,
        started_at: i64,
    ) -> Self {
        Self {
            message_id,
            guild_id,
            channel_id,
            role_id,
            started_at,
        }
    }

    /// Seconds elapsed since the check started
    #[inline]
    pub fn age(&self, now: i64) -> i64 {
        now - self.started_at
    }

    /// Whether the waiting window has fully elapsed
    #[inline]
    pub fn is_overdue(&self, now: i64, window_secs: i64) -> bool {
        self.age(now) >= window_secs
    }
}

/// Cutoff timestamp for overdue selection: checks started at or before it are due
#[inline]
pub fn overdue_cutoff(now: i64, window_secs: i64) -> i64 {
    now - window_secs
}
