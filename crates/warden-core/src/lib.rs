//! # warden-core
//!
//! Domain layer containing entities, value objects, the repository and platform
//! traits, and the reconciliation helper used by activity-check evaluation.
//! This crate has zero dependencies on infrastructure (database, HTTP, gateway).

pub mod entities;
pub mod error;
pub mod reconcile;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    overdue_cutoff, BanEntry, Channel, Embed, EmbedField, Guild, Member, Message,
    OutgoingMessage, PendingCheck, Role,
};
pub use error::{DomainError, ErrorKind};
pub use reconcile::non_acknowledged;
pub use traits::{
    BanRepository, PendingCheckRepository, Platform, PlatformResult, RepoResult,
};
pub use value_objects::{Snowflake, SnowflakeParseError};
