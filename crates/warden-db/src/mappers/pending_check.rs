//! Pending check <-> model mapper

use warden_core::{PendingCheck, Snowflake};

use crate::models::PendingCheckModel;

impl From<PendingCheckModel> for PendingCheck {
    fn from(model: PendingCheckModel) -> Self {
        PendingCheck {
            message_id: Snowflake::new(model.message_id),
            guild_id: Snowflake::new(model.guild_id),
            channel_id: Snowflake::new(model.channel_id),
            role_id: Snowflake::new(model.role_id),
            started_at: model.started_at,
        }
    }
}

/// Column values for a pending check insert
pub struct PendingCheckInsert {
    pub message_id: i64,
    pub guild_id: i64,
    pub channel_id: i64,
    pub role_id: i64,
    pub started_at: i64,
}

impl PendingCheckInsert {
    pub fn new(check: &PendingCheck) -> Self {
        Self {
            message_id: check.message_id.into_inner(),
            guild_id: check.guild_id.into_inner(),
            channel_id: check.channel_id.into_inner(),
            role_id: check.role_id.into_inner(),
            started_at: check.started_at,
        }
    }
}
