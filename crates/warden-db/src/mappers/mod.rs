//! Entity <-> model mappers
//!
//! - `From<Model> for Entity`: Convert database rows to domain objects
//! - `*Insert` structs: Prepare entity data for database writes

mod ban;
mod pending_check;

pub use ban::BanInsert;
pub use pending_check::PendingCheckInsert;
