//! Table definitions, applied idempotently at startup

use sqlx::PgPool;
use tracing::debug;

const STATEMENTS: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS blacklist (
        user_id     BIGINT PRIMARY KEY,
        username    TEXT NOT NULL,
        reason      TEXT,
        banned_by   TEXT NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS pending_activity_checks (
        message_id  BIGINT PRIMARY KEY,
        guild_id    BIGINT NOT NULL,
        channel_id  BIGINT NOT NULL,
        role_id     BIGINT NOT NULL,
        started_at  BIGINT NOT NULL
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_pending_activity_checks_started_at
        ON pending_activity_checks (started_at)
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_pending_activity_checks_guild
        ON pending_activity_checks (guild_id, started_at DESC)
    ",
];

/// Create the tables this crate reads and writes, if missing
///
/// # Errors
/// Returns the first failing statement's error
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    debug!(statements = STATEMENTS.len(), "Schema ensured");
    Ok(())
}
