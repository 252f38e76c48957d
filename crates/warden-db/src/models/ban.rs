//! Blacklist database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the blacklist table
#[derive(Debug, Clone, FromRow)]
pub struct BanModel {
    pub user_id: i64,
    pub username: String,
    pub reason: Option<String>,
    pub banned_by: String,
    pub created_at: DateTime<Utc>,
}
