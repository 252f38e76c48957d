//! Gateway payload definitions

use serde::{Deserialize, Serialize};
use warden_core::Snowflake;

/// Payload for op 10 (Hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

/// Payload for op 2 (Identify)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    pub token: String,
    pub intents: u64,
    pub properties: IdentifyProperties,
}

impl IdentifyPayload {
    pub fn new(token: impl Into<String>, intents: super::Intents) -> Self {
        Self {
            token: token.into(),
            intents: intents.bits(),
            properties: IdentifyProperties::default(),
        }
    }
}

/// Client connection properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyProperties {
    pub os: String,
    pub browser: String,
    pub device: String,
}

impl Default for IdentifyProperties {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: "warden".to_string(),
            device: "warden".to_string(),
        }
    }
}

/// Payload for op 6 (Resume)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumePayload {
    pub token: String,
    pub session_id: String,
    pub seq: u64,
}

/// Data of the READY dispatch
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyPayload {
    pub session_id: String,
    pub resume_gateway_url: String,
    pub user: ReadyUser,
}

/// The bot's own user, as reported in READY
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyUser {
    pub id: Snowflake,
    pub username: String,
}
