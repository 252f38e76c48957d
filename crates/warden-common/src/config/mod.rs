//! Configuration structs

mod app_config;

pub use app_config::{
    ActivityCheckConfig, AppConfig, AppSettings, ConfigError, DatabaseConfig, DiscordConfig,
    Environment, ModerationConfig,
};
