//! Channel entity

use crate::value_objects::Snowflake;

/// Text channel entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: Snowflake,
    /// Guild ID (None for DM channels)
    pub guild_id: Option<Snowflake>,
    pub name: Option<String>,
}

impl Channel {
    /// Create a new guild channel
    pub fn new(id: Snowflake, guild_id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            guild_id: Some(guild_id),
            name: Some(name.into()),
        }
    }

    /// Check whether the channel belongs to the given guild
    #[inline]
    pub fn belongs_to(&self, guild_id: Snowflake) -> bool {
        self.guild_id == Some(guild_id)
    }

    /// Channel mention markup
    pub fn mention(&self) -> String {
        format!("<#{}>", self.id)
    }
}
