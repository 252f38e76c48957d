//! # warden-db
//!
//! Database layer implementing the repository traits with PostgreSQL via SQLx.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warden_common::AppConfig;
//! use warden_db::{create_pool, ensure_schema, PgBanRepository};
//!
//! async fn example(config: &AppConfig) -> Result<(), sqlx::Error> {
//!     let pool = create_pool(&config.database).await?;
//!     ensure_schema(&pool).await?;
//!     let bans = PgBanRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;
pub mod schema;

// Re-export commonly used types
pub use pool::{create_pool, PgPool};
pub use repositories::{PgBanRepository, PgPendingCheckRepository};
pub use schema::ensure_schema;
