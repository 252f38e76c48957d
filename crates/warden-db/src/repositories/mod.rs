//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in warden-core.

mod ban;
mod error;
mod pending_check;

pub use ban::PgBanRepository;
pub use pending_check::PgPendingCheckRepository;
