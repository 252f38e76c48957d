//! Role entity

use crate::value_objects::Snowflake;

/// Guild role entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: String,
}

impl Role {
    /// Create a new Role
    pub fn new(id: Snowflake, guild_id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            guild_id,
            name: name.into(),
        }
    }

    /// Role mention markup
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.id)
    }
}
