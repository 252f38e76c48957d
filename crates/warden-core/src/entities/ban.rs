//! Ban entity - a blacklisted member and the metadata recorded at ban time

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Blacklist entry, keyed by the banned user's ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanEntry {
    pub user_id: Snowflake,
    /// Display name at the time of the ban
    pub username: String,
    pub reason: Option<String>,
    /// Name of the moderator who issued the ban
    pub banned_by: String,
    pub created_at: DateTime<Utc>,
}

impl BanEntry {
    /// Shown wherever a ban has no recorded reason
    pub const NO_REASON: &'static str = "Not provided";

    /// Create a new BanEntry stamped with the current time
    pub fn new(
        user_id: Snowflake,
        username: impl Into<String>,
        reason: Option<String>,
        banned_by: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            username: username.into(),
            reason: reason.filter(|r| !r.trim().is_empty()),
            banned_by: banned_by.into(),
            created_at: Utc::now(),
        }
    }

    /// Reason to display, falling back to [`BanEntry::NO_REASON`]
    pub fn reason_or_default(&self) -> &str {
        self.reason.as_deref().unwrap_or(Self::NO_REASON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ban_creation() {
        let ban = BanEntry::new(
            Snowflake::new(42),
            "spammer",
            Some("raiding".to_string()),
            "mod",
        );
        assert_eq!(ban.user_id, Snowflake::new(42));
        assert_eq!(ban.username, "spammer");
        assert_eq!(ban.reason_or_default(), "raiding");
        assert_eq!(ban.banned_by, "mod");
    }

    #[test]
    fn test_reason_fallback() {
        let ban = BanEntry::new(Snowflake::new(1), "a", None, "mod");
        assert_eq!(ban.reason_or_default(), BanEntry::NO_REASON);

        // Blank reasons are treated as missing
        let ban = BanEntry::new(Snowflake::new(1), "a", Some("   ".to_string()), "mod");
        assert!(ban.reason.is_none());
        assert_eq!(ban.reason_or_default(), "Not provided");
    }
}
