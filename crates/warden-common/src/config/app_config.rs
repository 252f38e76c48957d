//! Application configuration structs
//!
//! Loaded once at startup from environment variables (and `.env`), then
//! passed to every component. Nothing else reads the environment.

use std::env;
use std::time::Duration;

use warden_core::Snowflake;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub discord: DiscordConfig,
    pub moderation: ModerationConfig,
    pub activity: ActivityCheckConfig,
    pub database: DatabaseConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Discord connection settings
#[derive(Clone)]
pub struct DiscordConfig {
    pub token: String,
    pub command_prefix: String,
    pub request_timeout_secs: u64,
}

impl DiscordConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// Keep the token out of logs
impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"<redacted>")
            .field("command_prefix", &self.command_prefix)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Blacklist enforcement settings
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    /// Role applied to blacklisted members
    pub blacklist_role_id: Snowflake,
    /// Channel receiving ban/unban/rejoin notifications
    pub log_channel_id: Snowflake,
    /// Role required to run operator commands
    pub moderator_role_id: Snowflake,
}

/// Activity check settings
#[derive(Debug, Clone)]
pub struct ActivityCheckConfig {
    pub channel_id: Snowflake,
    pub role_id: Snowflake,
    /// Waiting window before a check is evaluated
    pub window_secs: i64,
    /// Evaluator tick interval
    pub tick_secs: u64,
    /// Upper bound for evaluating a single check
    pub timeout_secs: u64,
    /// Acknowledgement reaction
    pub emoji: String,
}

impl ActivityCheckConfig {
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_secs)
    }

    #[must_use]
    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

// Default value functions
fn default_app_name() -> String {
    "warden".to_string()
}

fn default_command_prefix() -> String {
    "!".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_window_secs() -> i64 {
    86_400 // 24 hours
}

fn default_tick_secs() -> u64 {
    3_600 // 1 hour
}

fn default_check_timeout() -> u64 {
    60
}

fn default_emoji() -> String {
    "✅".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns an error if required keys are missing or any value is malformed
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = Source(lookup);

        let env = match source.get("APP_ENV") {
            Some(raw) => Environment::parse(&raw)
                .ok_or(ConfigError::InvalidValue("APP_ENV", raw))?,
            None => Environment::default(),
        };

        let command_prefix = source
            .get("COMMAND_PREFIX")
            .unwrap_or_else(default_command_prefix);
        if command_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue("COMMAND_PREFIX", command_prefix));
        }

        let window_secs = source.parse_or("ACTIVITY_CHECK_WINDOW_SECS", default_window_secs)?;
        if window_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "ACTIVITY_CHECK_WINDOW_SECS",
                window_secs.to_string(),
            ));
        }

        let tick_secs = source.parse_or("ACTIVITY_CHECK_TICK_SECS", default_tick_secs)?;
        if tick_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "ACTIVITY_CHECK_TICK_SECS",
                tick_secs.to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: source.get("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            discord: DiscordConfig {
                token: source.required("DISCORD_TOKEN")?,
                command_prefix,
                request_timeout_secs: source
                    .parse_or("DISCORD_REQUEST_TIMEOUT_SECS", default_request_timeout)?,
            },
            moderation: ModerationConfig {
                blacklist_role_id: source.required_id("BLACKLIST_ROLE_ID")?,
                log_channel_id: source.required_id("LOG_CHANNEL_ID")?,
                moderator_role_id: source.required_id("MODERATOR_ROLE_ID")?,
            },
            activity: ActivityCheckConfig {
                channel_id: source.required_id("ACTIVITY_CHANNEL_ID")?,
                role_id: source.required_id("ACTIVITY_ROLE_ID")?,
                window_secs,
                tick_secs,
                timeout_secs: source
                    .parse_or("ACTIVITY_CHECK_TIMEOUT_SECS", default_check_timeout)?,
                emoji: source.get("ACTIVITY_CHECK_EMOJI").unwrap_or_else(default_emoji),
            },
            database: DatabaseConfig {
                url: source.required("DATABASE_URL")?,
                max_connections: source
                    .parse_or("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: source
                    .parse_or("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
            },
        })
    }
}

/// Key lookup with typed accessors
struct Source<F>(F);

impl<F> Source<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::MissingVar(key))
    }

    fn required_id(&self, key: &'static str) -> Result<Snowflake, ConfigError> {
        let raw = self.required(key)?;
        Snowflake::parse(&raw).map_err(|_| ConfigError::InvalidValue(key, raw))
    }

    fn parse_or<T, D>(&self, key: &'static str, default: D) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        D: FnOnce() -> T,
    {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key, raw)),
            None => Ok(default()),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DISCORD_TOKEN", "token"),
            ("BLACKLIST_ROLE_ID", "1363605271846322001"),
            ("LOG_CHANNEL_ID", "1363605271846322002"),
            ("MODERATOR_ROLE_ID", "1363605271846322003"),
            ("ACTIVITY_CHANNEL_ID", "1363606117355229184"),
            ("ACTIVITY_ROLE_ID", "1363605271846322296"),
            ("DATABASE_URL", "postgres://localhost/warden"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_source(|key| vars.get(key).map(ToString::to_string))
    }

    #[test]
    fn test_load_with_defaults() {
        let config = load(&base_vars()).unwrap();
        assert_eq!(config.app.name, "warden");
        assert_eq!(config.app.env, Environment::Development);
        assert_eq!(config.discord.command_prefix, "!");
        assert_eq!(config.activity.window_secs, 86_400);
        assert_eq!(config.activity.tick_interval(), Duration::from_secs(3_600));
        assert_eq!(config.activity.emoji, "✅");
        assert_eq!(
            config.activity.role_id,
            Snowflake::new(1363605271846322296)
        );
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_missing_required_var() {
        let mut vars = base_vars();
        vars.remove("BLACKLIST_ROLE_ID");
        assert!(matches!(
            load(&vars),
            Err(ConfigError::MissingVar("BLACKLIST_ROLE_ID"))
        ));
    }

    #[test]
    fn test_malformed_id() {
        let mut vars = base_vars();
        vars.insert("LOG_CHANNEL_ID", "not-a-number");
        assert!(matches!(
            load(&vars),
            Err(ConfigError::InvalidValue("LOG_CHANNEL_ID", _))
        ));
    }

    #[test]
    fn test_malformed_optional_value() {
        let mut vars = base_vars();
        vars.insert("ACTIVITY_CHECK_TICK_SECS", "hourly");
        assert!(matches!(
            load(&vars),
            Err(ConfigError::InvalidValue("ACTIVITY_CHECK_TICK_SECS", _))
        ));

        let mut vars = base_vars();
        vars.insert("ACTIVITY_CHECK_WINDOW_SECS", "0");
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_overrides() {
        let mut vars = base_vars();
        vars.insert("APP_ENV", "production");
        vars.insert("COMMAND_PREFIX", "?");
        vars.insert("ACTIVITY_CHECK_WINDOW_SECS", "60");
        let config = load(&vars).unwrap();
        assert!(config.app.env.is_production());
        assert_eq!(config.discord.command_prefix, "?");
        assert_eq!(config.activity.window_secs, 60);
    }

    #[test]
    fn test_token_is_redacted() {
        let config = load(&base_vars()).unwrap();
        let debug = format!("{:?}", config.discord);
        assert!(!debug.contains("token\""));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_environment_predicates() {
        assert!(!Environment::Development.is_production());
        assert!(Environment::Production.is_production());
        assert!(Environment::Development.is_development());
    }
}
