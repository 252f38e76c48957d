//! Ban entry <-> model mapper

use chrono::{DateTime, Utc};
use warden_core::{BanEntry, Snowflake};

use crate::models::BanModel;

impl From<BanModel> for BanEntry {
    fn from(model: BanModel) -> Self {
        BanEntry {
            user_id: Snowflake::new(model.user_id),
            username: model.username,
            reason: model.reason,
            banned_by: model.banned_by,
            created_at: model.created_at,
        }
    }
}

/// Column values for a blacklist upsert
pub struct BanInsert<'a> {
    pub user_id: i64,
    pub username: &'a str,
    pub reason: Option<&'a str>,
    pub banned_by: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> BanInsert<'a> {
    pub fn new(entry: &'a BanEntry) -> Self {
        Self {
            user_id: entry.user_id.into_inner(),
            username: &entry.username,
            reason: entry.reason.as_deref(),
            banned_by: &entry.banned_by,
            created_at: entry.created_at,
        }
    }
}
