//! Member entity - represents a user's membership in a guild

use crate::value_objects::Snowflake;

/// Guild member entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    pub username: String,
    pub nickname: Option<String>,
    pub role_ids: Vec<Snowflake>,
    /// Automated account
    pub bot: bool,
}

impl Member {
    /// Create a new Member without roles
    pub fn new(guild_id: Snowflake, user_id: Snowflake, username: impl Into<String>) -> Self {
        Self {
            guild_id,
            user_id,
            username: username.into(),
            nickname: None,
            role_ids: Vec::new(),
            bot: false,
        }
    }

    /// Builder-style role assignment
    #[must_use]
    pub fn with_roles(mut self, role_ids: Vec<Snowflake>) -> Self {
        self.role_ids = role_ids;
        self
    }

    /// Get display name (nickname if set, otherwise username)
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.username)
    }

    /// Check if member has a specific role
    #[inline]
    pub fn has_role(&self, role_id: Snowflake) -> bool {
        self.role_ids.contains(&role_id)
    }

    /// User mention markup
    pub fn mention(&self) -> String {
        format!("<@{}>", self.user_id)
    }
}
