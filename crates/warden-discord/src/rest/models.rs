//! Wire models for the REST endpoints the client calls

use serde::{Deserialize, Serialize};
use warden_core::{Embed, Member, OutgoingMessage, Snowflake};

#[derive(Debug, Clone, Deserialize)]
pub struct GuildDto {
    pub id: Snowflake,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelDto {
    pub id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleDto {
    pub id: Snowflake,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageDto {
    pub id: Snowflake,
    pub channel_id: Snowflake,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserDto {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberDto {
    pub user: UserDto,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
}

impl MemberDto {
    pub fn into_member(self, guild_id: Snowflake) -> Member {
        Member {
            guild_id,
            user_id: self.user.id,
            username: self.user.username,
            nickname: self.nick.or(self.user.global_name),
            role_ids: self.roles,
            bot: self.user.bot,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayBotDto {
    pub url: String,
}

/// Body of `POST /channels/{id}/messages`
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<EmbedDto>,
    pub allowed_mentions: AllowedMentions,
}

/// Only user and role mentions ping; `@everyone` never does
#[derive(Debug, Clone, Serialize)]
pub struct AllowedMentions {
    pub parse: Vec<&'static str>,
}

impl From<&OutgoingMessage> for CreateMessage {
    fn from(message: &OutgoingMessage) -> Self {
        Self {
            content: message.content.clone(),
            embeds: message.embeds.iter().map(EmbedDto::from).collect(),
            allowed_mentions: AllowedMentions {
                parse: vec!["users", "roles"],
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedDto {
    pub title: String,
    pub description: String,
    pub color: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedFieldDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooterDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFieldDto {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooterDto {
    pub text: String,
}

impl From<&Embed> for EmbedDto {
    fn from(embed: &Embed) -> Self {
        Self {
            title: embed.title.clone(),
            description: embed.description.clone(),
            color: embed.color,
            fields: embed
                .fields
                .iter()
                .map(|f| EmbedFieldDto {
                    name: f.name.clone(),
                    value: f.value.clone(),
                    inline: f.inline,
                })
                .collect(),
            footer: embed
                .footer
                .as_ref()
                .map(|text| EmbedFooterDto { text: text.clone() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_member_dto() {
        let dto: MemberDto = serde_json::from_value(json!({
            "user": {"id": "42", "username": "alice", "global_name": "Alice"},
            "nick": null,
            "roles": ["7", "8"],
            "joined_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        let member = dto.into_member(Snowflake::new(1));
        assert_eq!(member.user_id, Snowflake::new(42));
        assert_eq!(member.display_name(), "Alice");
        assert!(member.has_role(Snowflake::new(8)));
        assert!(!member.bot);
    }

    #[test]
    fn test_create_message_body() {
        let outgoing = OutgoingMessage::embed(
            Embed::new("Title", "Body", Embed::GREEN)
                .field("Moderator", "mod", true)
                .footer("User ID: 5"),
        );
        let body = serde_json::to_value(CreateMessage::from(&outgoing)).unwrap();
        assert!(body.get("content").is_none());
        assert_eq!(body["embeds"][0]["footer"]["text"], json!("User ID: 5"));
        assert_eq!(body["embeds"][0]["fields"][0]["inline"], json!(true));
        assert_eq!(body["allowed_mentions"]["parse"], json!(["users", "roles"]));
    }
}
