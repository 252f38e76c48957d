//! Database connection pool management

mod postgres;

pub use postgres::{create_pool, ACQUIRE_TIMEOUT, IDLE_TIMEOUT, MAX_LIFETIME};

// Re-export PgPool for convenience
pub use sqlx::postgres::PgPool;
