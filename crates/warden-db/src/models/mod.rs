//! Database models - SQLx-compatible structs for PostgreSQL tables

mod ban;
mod pending_check;

pub use ban::BanModel;
pub use pending_check::PendingCheckModel;
