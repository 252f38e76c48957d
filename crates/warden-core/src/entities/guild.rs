//! Guild entity - the community the bot moderates

use crate::value_objects::Snowflake;

/// Guild (server) entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guild {
    pub id: Snowflake,
    pub name: String,
}

impl Guild {
    /// Create a new Guild
    pub fn new(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
