//! Ports - interfaces the domain needs from infrastructure

mod platform;
mod repositories;

pub use platform::{Platform, PlatformResult};
pub use repositories::{BanRepository, PendingCheckRepository, RepoResult};
