//! Dispatch events the bot reacts to
//!
//! Everything except READY, GUILD_MEMBER_ADD and MESSAGE_CREATE is ignored.

use serde::Deserialize;
use serde_json::Value;
use warden_core::{Member, Snowflake};

use crate::rest::{MemberDto, UserDto};

/// Dispatch event names
pub mod names {
    pub const READY: &str = "READY";
    pub const RESUMED: &str = "RESUMED";
    pub const GUILD_MEMBER_ADD: &str = "GUILD_MEMBER_ADD";
    pub const MESSAGE_CREATE: &str = "MESSAGE_CREATE";
}

/// Event forwarded to the application
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    /// Session established
    Ready {
        user_id: Snowflake,
        session_id: String,
    },
    /// A user joined a guild
    MemberJoin(Member),
    /// A message was posted
    MessageCreate(CommandMessage),
}

/// A user mentioned in a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionedUser {
    pub id: Snowflake,
    pub username: String,
}

/// A posted message, reduced to what command handling needs
#[derive(Debug, Clone, PartialEq)]
pub struct CommandMessage {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    /// `None` for direct messages
    pub guild_id: Option<Snowflake>,
    pub author_id: Snowflake,
    pub author_name: String,
    pub author_bot: bool,
    /// Role ids of the author in the guild
    pub member_role_ids: Vec<Snowflake>,
    pub content: String,
    pub mentions: Vec<MentionedUser>,
}

impl CommandMessage {
    /// Display name of a mentioned user
    pub fn mentioned_name(&self, user_id: Snowflake) -> Option<&str> {
        self.mentions
            .iter()
            .find(|m| m.id == user_id)
            .map(|m| m.username.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct MemberAddData {
    guild_id: Snowflake,
    #[serde(flatten)]
    member: MemberDto,
}

#[derive(Debug, Deserialize)]
struct PartialMember {
    #[serde(default)]
    roles: Vec<Snowflake>,
}

#[derive(Debug, Deserialize)]
struct MessageCreateData {
    id: Snowflake,
    channel_id: Snowflake,
    #[serde(default)]
    guild_id: Option<Snowflake>,
    author: UserDto,
    #[serde(default)]
    member: Option<PartialMember>,
    #[serde(default)]
    content: String,
    #[serde(default)]
    mentions: Vec<UserDto>,
}

impl GatewayEvent {
    /// Decode a dispatch by name
    ///
    /// Returns `Ok(None)` for events the bot does not handle.
    pub fn from_dispatch(name: &str, data: Value) -> Result<Option<Self>, serde_json::Error> {
        let event = match name {
            names::MESSAGE_CREATE => {
                let data: MessageCreateData = serde_json::from_value(data)?;
                Self::MessageCreate(CommandMessage {
                    id: data.id,
                    channel_id: data.channel_id,
                    guild_id: data.guild_id,
                    author_id: data.author.id,
                    author_name: data.author.username,
                    author_bot: data.author.bot,
                    member_role_ids: data.member.map(|m| m.roles).unwrap_or_default(),
                    content: data.content,
                    mentions: data
                        .mentions
                        .into_iter()
                        .map(|u| MentionedUser {
                            id: u.id,
                            username: u.username,
                        })
                        .collect(),
                })
            }
            names::GUILD_MEMBER_ADD => {
                let data: MemberAddData = serde_json::from_value(data)?;
                Self::MemberJoin(data.member.into_member(data.guild_id))
            }
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_create_decoded() {
        let data = json!({
            "id": "900",
            "channel_id": "100",
            "guild_id": "1",
            "author": { "id": "7", "username": "mod" },
            "member": { "roles": ["202", "300"] },
            "content": "!blacklist <@42> spam",
            "mentions": [{ "id": "42", "username": "spammer", "bot": false }],
            "tts": false
        });

        let event = GatewayEvent::from_dispatch(names::MESSAGE_CREATE, data)
            .unwrap()
            .unwrap();

        let GatewayEvent::MessageCreate(msg) = event else {
            panic!("expected MessageCreate");
        };
        assert_eq!(msg.guild_id, Some(Snowflake::new(1)));
        assert_eq!(msg.author_id, Snowflake::new(7));
        assert!(!msg.author_bot);
        assert_eq!(
            msg.member_role_ids,
            vec![Snowflake::new(202), Snowflake::new(300)]
        );
        assert_eq!(msg.mentioned_name(Snowflake::new(42)), Some("spammer"));
        assert_eq!(msg.mentioned_name(Snowflake::new(43)), None);
    }

    #[test]
    fn test_direct_message_has_no_guild() {
        let data = json!({
            "id": "900",
            "channel_id": "100",
            "author": { "id": "7", "username": "someone", "bot": true },
            "content": "hi"
        });

        let Some(GatewayEvent::MessageCreate(msg)) =
            GatewayEvent::from_dispatch(names::MESSAGE_CREATE, data).unwrap()
        else {
            panic!("expected MessageCreate");
        };
        assert_eq!(msg.guild_id, None);
        assert!(msg.author_bot);
        assert!(msg.member_role_ids.is_empty());
        assert!(msg.mentions.is_empty());
    }

    #[test]
    fn test_member_add_decoded() {
        let data = json!({
            "guild_id": "1",
            "user": { "id": "42", "username": "returning" },
            "nick": null,
            "roles": [],
            "joined_at": "2024-01-01T00:00:00Z"
        });

        let Some(GatewayEvent::MemberJoin(member)) =
            GatewayEvent::from_dispatch(names::GUILD_MEMBER_ADD, data).unwrap()
        else {
            panic!("expected MemberJoin");
        };
        assert_eq!(member.guild_id, Snowflake::new(1));
        assert_eq!(member.user_id, Snowflake::new(42));
        assert_eq!(member.username, "returning");
    }

    #[test]
    fn test_unhandled_events_ignored() {
        let parsed = GatewayEvent::from_dispatch("TYPING_START", json!({})).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn test_malformed_payload_is_error() {
        let result = GatewayEvent::from_dispatch(names::MESSAGE_CREATE, json!({ "id": "1" }));
        assert!(result.is_err());
    }
}
