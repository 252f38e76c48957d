//! Service context - dependency container for services
//!
//! Holds the repositories, the platform client and the settings services need.

use std::sync::Arc;

use tokio::sync::Mutex;
use warden_common::{ActivityCheckConfig, ModerationConfig};
use warden_core::{BanRepository, PendingCheckRepository, Platform};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// Cloning is cheap; every clone shares the same repositories, platform
/// client and evaluation lock.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    ban_repo: Arc<dyn BanRepository>,
    check_repo: Arc<dyn PendingCheckRepository>,

    // Platform
    platform: Arc<dyn Platform>,

    // Settings
    moderation: ModerationConfig,
    activity: ActivityCheckConfig,

    // Serializes evaluation passes
    evaluation_lock: Arc<Mutex<()>>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        ban_repo: Arc<dyn BanRepository>,
        check_repo: Arc<dyn PendingCheckRepository>,
        platform: Arc<dyn Platform>,
        moderation: ModerationConfig,
        activity: ActivityCheckConfig,
    ) -> Self {
        Self {
            ban_repo,
            check_repo,
            platform,
            moderation,
            activity,
            evaluation_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    /// Get the ban repository
    pub fn ban_repo(&self) -> &dyn BanRepository {
        self.ban_repo.as_ref()
    }

    /// Get the pending check repository
    pub fn check_repo(&self) -> &dyn PendingCheckRepository {
        self.check_repo.as_ref()
    }

    // === Platform ===

    /// Get the platform client
    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    // === Settings ===

    pub fn moderation(&self) -> &ModerationConfig {
        &self.moderation
    }

    pub fn activity(&self) -> &ActivityCheckConfig {
        &self.activity
    }

    pub(crate) fn evaluation_lock(&self) -> &Mutex<()> {
        &self.evaluation_lock
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    ban_repo: Option<Arc<dyn BanRepository>>,
    check_repo: Option<Arc<dyn PendingCheckRepository>>,
    platform: Option<Arc<dyn Platform>>,
    moderation: Option<ModerationConfig>,
    activity: Option<ActivityCheckConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ban_repo(mut self, repo: Arc<dyn BanRepository>) -> Self {
        self.ban_repo = Some(repo);
        self
    }

    pub fn check_repo(mut self, repo: Arc<dyn PendingCheckRepository>) -> Self {
        self.check_repo = Some(repo);
        self
    }

    pub fn platform(mut self, platform: Arc<dyn Platform>) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn moderation(mut self, config: ModerationConfig) -> Self {
        self.moderation = Some(config);
        self
    }

    pub fn activity(mut self, config: ActivityCheckConfig) -> Self {
        self.activity = Some(config);
        self
    }

    /// Build the context
    ///
    /// # Errors
    /// Returns a configuration error naming the first missing dependency
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.ban_repo.ok_or_else(|| missing("ban_repo"))?,
            self.check_repo.ok_or_else(|| missing("check_repo"))?,
            self.platform.ok_or_else(|| missing("platform"))?,
            self.moderation.ok_or_else(|| missing("moderation"))?,
            self.activity.ok_or_else(|| missing("activity"))?,
        ))
    }
}

fn missing(dependency: &str) -> ServiceError {
    ServiceError::config(format!("service context is missing {dependency}"))
}
