//! PostgreSQL implementation of BanRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use warden_core::{BanEntry, BanRepository, RepoResult, Snowflake};

use crate::mappers::BanInsert;
use crate::models::BanModel;

use super::error::map_db_error;

/// PostgreSQL implementation of BanRepository
#[derive(Clone)]
pub struct PgBanRepository {
    pool: PgPool,
}

impl PgBanRepository {
    /// Create a new PgBanRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BanRepository for PgBanRepository {
    #[instrument(skip(self))]
    async fn find(&self, user_id: Snowflake) -> RepoResult<Option<BanEntry>> {
        let result = sqlx::query_as::<_, BanModel>(
            r"
            SELECT user_id, username, reason, banned_by, created_at
            FROM blacklist
            WHERE user_id = $1
            ",
        )
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(BanEntry::from))
    }

    #[instrument(skip(self, entry), fields(user_id = %entry.user_id))]
    async fn upsert(&self, entry: &BanEntry) -> RepoResult<()> {
        let row = BanInsert::new(entry);

        sqlx::query(
            r"
            INSERT INTO blacklist (user_id, username, reason, banned_by, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET username = EXCLUDED.username,
                reason = EXCLUDED.reason,
                banned_by = EXCLUDED.banned_by,
                created_at = EXCLUDED.created_at
            ",
        )
        .bind(row.user_id)
        .bind(row.username)
        .bind(row.reason)
        .bind(row.banned_by)
        .bind(row.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM blacklist WHERE user_id = $1
            ",
        )
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> RepoResult<Vec<BanEntry>> {
        let results = sqlx::query_as::<_, BanModel>(
            r"
            SELECT user_id, username, reason, banned_by, created_at
            FROM blacklist
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(BanEntry::from).collect())
    }
}
