//! PostgreSQL implementation of PendingCheckRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use warden_core::{PendingCheck, PendingCheckRepository, RepoResult, Snowflake};

use crate::mappers::PendingCheckInsert;
use crate::models::PendingCheckModel;

use super::error::map_db_error;

/// PostgreSQL implementation of PendingCheckRepository
#[derive(Clone)]
pub struct PgPendingCheckRepository {
    pool: PgPool,
}

impl PgPendingCheckRepository {
    /// Create a new PgPendingCheckRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PendingCheckRepository for PgPendingCheckRepository {
    #[instrument(skip(self, check), fields(message_id = %check.message_id))]
    async fn create(&self, check: &PendingCheck) -> RepoResult<()> {
        let row = PendingCheckInsert::new(check);

        sqlx::query(
            r"
            INSERT INTO pending_activity_checks (message_id, guild_id, channel_id, role_id, started_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(row.message_id)
        .bind(row.guild_id)
        .bind(row.channel_id)
        .bind(row.role_id)
        .bind(row.started_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find(&self, message_id: Snowflake) -> RepoResult<Option<PendingCheck>> {
        let result = sqlx::query_as::<_, PendingCheckModel>(
            r"
            SELECT message_id, guild_id, channel_id, role_id, started_at
            FROM pending_activity_checks
            WHERE message_id = $1
            ",
        )
        .bind(message_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(PendingCheck::from))
    }

    #[instrument(skip(self))]
    async fn list_overdue(&self, cutoff: i64) -> RepoResult<Vec<PendingCheck>> {
        let results = sqlx::query_as::<_, PendingCheckModel>(
            r"
            SELECT message_id, guild_id, channel_id, role_id, started_at
            FROM pending_activity_checks
            WHERE started_at <= $1
            ORDER BY started_at ASC
            ",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(PendingCheck::from).collect())
    }

    #[instrument(skip(self))]
    async fn latest_for_guild(&self, guild_id: Snowflake) -> RepoResult<Option<PendingCheck>> {
        let result = sqlx::query_as::<_, PendingCheckModel>(
            r"
            SELECT message_id, guild_id, channel_id, role_id, started_at
            FROM pending_activity_checks
            WHERE guild_id = $1
            ORDER BY started_at DESC, message_id DESC
            LIMIT 1
            ",
        )
        .bind(guild_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(PendingCheck::from))
    }

    #[instrument(skip(self))]
    async fn delete(&self, message_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM pending_activity_checks WHERE message_id = $1
            ",
        )
        .bind(message_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
