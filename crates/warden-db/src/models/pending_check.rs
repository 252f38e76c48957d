//! Pending activity check database model

use sqlx::FromRow;

/// Database model for the pending_activity_checks table
#[derive(Debug, Clone, FromRow)]
pub struct PendingCheckModel {
    pub message_id: i64,
    pub guild_id: i64,
    pub channel_id: i64,
    pub role_id: i64,
    pub started_at: i64,
}
