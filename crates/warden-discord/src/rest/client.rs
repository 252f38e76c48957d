//! REST client implementing the platform trait

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use warden_core::{
    Channel, DomainError, Guild, Member, Message, OutgoingMessage, Platform, PlatformResult, Role,
    Snowflake,
};

use super::error::{classify_status, ApiErrorBody, Resource};
use super::models::{
    ChannelDto, CreateMessage, GatewayBotDto, GuildDto, MemberDto, MessageDto, RoleDto, UserDto,
};

/// Longest rate-limit wait honoured before giving up as transient
const MAX_RATE_LIMIT_WAIT: f64 = 5.0;
const REACTIONS_PAGE: usize = 100;
const MEMBERS_PAGE: usize = 1000;

/// Discord REST API client
#[derive(Clone)]
pub struct DiscordClient {
    http: Client,
    base_url: String,
}

impl DiscordClient {
    /// Default API root
    pub const API_BASE: &'static str = "https://discord.com/api/v10";

    /// Create a client authenticating as a bot
    ///
    /// # Errors
    /// `Configuration` if the token is not a valid header value or the HTTP
    /// client cannot be built
    pub fn new(token: &str, timeout: Duration) -> PlatformResult<Self> {
        Self::with_base_url(token, timeout, Self::API_BASE)
    }

    /// Create a client against a different API root
    ///
    /// # Errors
    /// As [`Self::new`]
    pub fn with_base_url(
        token: &str,
        timeout: Duration,
        base_url: impl Into<String>,
    ) -> PlatformResult<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bot {token}"))
            .map_err(|_| DomainError::Configuration("token contains invalid characters".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("DiscordBot (warden, ", env!("CARGO_PKG_VERSION"), ")")),
        );

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Gateway URL to connect to
    ///
    /// # Errors
    /// Any classified REST failure
    pub async fn gateway_url(&self) -> PlatformResult<String> {
        let dto: GatewayBotDto = self
            .get_json("/gateway/bot", Resource::Gateway, &[])
            .await?;
        Ok(dto.url)
    }

    // =========================================================================
    // Request helpers
    // =========================================================================

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{path}", self.base_url))
    }

    /// Send a request, retrying once after a short rate limit
    async fn execute(
        &self,
        request: RequestBuilder,
        resource: Resource,
        ids: &[Resource],
    ) -> PlatformResult<Response> {
        let mut retried = false;
        loop {
            let attempt = request
                .try_clone()
                .ok_or_else(|| DomainError::Transient("request body is not replayable".into()))?;
            let response = attempt.send().await.map_err(transport_error)?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let body: Option<ApiErrorBody> = response.json().await.ok();
            if status == StatusCode::TOO_MANY_REQUESTS && !retried {
                if let Some(wait) = body
                    .as_ref()
                    .and_then(|b| b.retry_after)
                    .filter(|s| (0.0..=MAX_RATE_LIMIT_WAIT).contains(s))
                {
                    debug!(retry_after = wait, "Rate limited; retrying");
                    tokio::time::sleep(Duration::from_secs_f64(wait)).await;
                    retried = true;
                    continue;
                }
            }

            return Err(classify_status(status, body.as_ref(), resource, ids));
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        resource: Resource,
        ids: &[Resource],
    ) -> PlatformResult<T> {
        let response = self
            .execute(self.request(Method::GET, path), resource, ids)
            .await?;
        response.json().await.map_err(transport_error)
    }

    async fn send_empty(
        &self,
        method: Method,
        path: &str,
        resource: Resource,
        ids: &[Resource],
    ) -> PlatformResult<()> {
        self.execute(self.request(method, path), resource, ids)
            .await
            .map(drop)
    }
}

fn transport_error(err: reqwest::Error) -> DomainError {
    if err.is_timeout() {
        DomainError::Transient("request timed out".to_string())
    } else if err.is_decode() {
        DomainError::Transient(format!("unexpected response body: {err}"))
    } else {
        DomainError::Transient(err.to_string())
    }
}

fn emoji_path(emoji: &str) -> String {
    urlencoding::encode(emoji).into_owned()
}

#[async_trait]
impl Platform for DiscordClient {
    #[instrument(skip(self))]
    async fn resolve_guild(&self, guild_id: Snowflake) -> PlatformResult<Guild> {
        let dto: GuildDto = self
            .get_json(
                &format!("/guilds/{guild_id}"),
                Resource::Guild(guild_id),
                &[Resource::Guild(guild_id)],
            )
            .await?;
        Ok(Guild::new(dto.id, dto.name))
    }

    #[instrument(skip(self))]
    async fn resolve_channel(
        &self,
        guild_id: Snowflake,
        channel_id: Snowflake,
    ) -> PlatformResult<Channel> {
        let dto: ChannelDto = self
            .get_json(
                &format!("/channels/{channel_id}"),
                Resource::Channel(channel_id),
                &[Resource::Channel(channel_id)],
            )
            .await?;

        // A channel of another guild is as good as missing
        if dto.guild_id != Some(guild_id) {
            return Err(DomainError::ChannelNotFound(channel_id));
        }

        Ok(Channel {
            id: dto.id,
            guild_id: dto.guild_id,
            name: dto.name,
        })
    }

    #[instrument(skip(self))]
    async fn resolve_role(&self, guild_id: Snowflake, role_id: Snowflake) -> PlatformResult<Role> {
        let roles: Vec<RoleDto> = self
            .get_json(
                &format!("/guilds/{guild_id}/roles"),
                Resource::Guild(guild_id),
                &[Resource::Guild(guild_id)],
            )
            .await?;

        roles
            .into_iter()
            .find(|r| r.id == role_id)
            .map(|r| Role::new(r.id, guild_id, r.name))
            .ok_or(DomainError::RoleNotFound(role_id))
    }

    #[instrument(skip(self))]
    async fn fetch_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> PlatformResult<Message> {
        let dto: MessageDto = self
            .get_json(
                &format!("/channels/{channel_id}/messages/{message_id}"),
                Resource::Message(message_id),
                &[Resource::Channel(channel_id), Resource::Message(message_id)],
            )
            .await?;
        Ok(Message::new(dto.id, dto.channel_id))
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn reaction_users(
        &self,
        message: &Message,
        emoji: &str,
    ) -> PlatformResult<HashSet<Snowflake>> {
        let ids = [
            Resource::Channel(message.channel_id),
            Resource::Message(message.id),
        ];
        let base = format!(
            "/channels/{}/messages/{}/reactions/{}",
            message.channel_id,
            message.id,
            emoji_path(emoji)
        );

        let mut users = HashSet::new();
        let mut after: Option<Snowflake> = None;
        loop {
            let path = match after {
                Some(last) => format!("{base}?limit={REACTIONS_PAGE}&after={last}"),
                None => format!("{base}?limit={REACTIONS_PAGE}"),
            };
            let page: Vec<UserDto> = self
                .get_json(&path, Resource::Message(message.id), &ids)
                .await?;

            let full = page.len() == REACTIONS_PAGE;
            after = page.iter().map(|u| u.id).max();
            users.extend(page.into_iter().filter(|u| !u.bot).map(|u| u.id));

            if !full || after.is_none() {
                break;
            }
        }

        debug!(count = users.len(), "Collected reaction users");
        Ok(users)
    }

    #[instrument(skip(self, role), fields(role_id = %role.id))]
    async fn role_members(&self, role: &Role) -> PlatformResult<HashSet<Snowflake>> {
        let guild_id = role.guild_id;
        let mut holders = HashSet::new();
        let mut after: Option<Snowflake> = None;

        loop {
            let path = match after {
                Some(last) => format!("/guilds/{guild_id}/members?limit={MEMBERS_PAGE}&after={last}"),
                None => format!("/guilds/{guild_id}/members?limit={MEMBERS_PAGE}"),
            };
            let page: Vec<MemberDto> = self
                .get_json(&path, Resource::Guild(guild_id), &[Resource::Guild(guild_id)])
                .await?;

            let full = page.len() == MEMBERS_PAGE;
            after = page.iter().map(|m| m.user.id).max();
            holders.extend(
                page.iter()
                    .filter(|m| m.roles.contains(&role.id))
                    .map(|m| m.user.id),
            );

            if !full || after.is_none() {
                break;
            }
        }

        debug!(count = holders.len(), "Collected role members");
        Ok(holders)
    }

    #[instrument(skip(self))]
    async fn find_member(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> PlatformResult<Option<Member>> {
        let result: PlatformResult<MemberDto> = self
            .get_json(
                &format!("/guilds/{guild_id}/members/{user_id}"),
                Resource::Member(user_id),
                &[Resource::Guild(guild_id), Resource::Member(user_id)],
            )
            .await;

        match result {
            Ok(dto) => Ok(Some(dto.into_member(guild_id))),
            Err(DomainError::MemberNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn grant_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> PlatformResult<()> {
        self.send_empty(
            Method::PUT,
            &format!("/guilds/{guild_id}/members/{user_id}/roles/{role_id}"),
            Resource::Member(user_id),
            &[
                Resource::Guild(guild_id),
                Resource::Member(user_id),
                Resource::Role(role_id),
            ],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn revoke_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> PlatformResult<()> {
        self.send_empty(
            Method::DELETE,
            &format!("/guilds/{guild_id}/members/{user_id}/roles/{role_id}"),
            Resource::Member(user_id),
            &[
                Resource::Guild(guild_id),
                Resource::Member(user_id),
                Resource::Role(role_id),
            ],
        )
        .await
    }

    #[instrument(skip(self, message))]
    async fn post_message(
        &self,
        channel_id: Snowflake,
        message: &OutgoingMessage,
    ) -> PlatformResult<Message> {
        if message.is_empty() {
            warn!("Refusing to post an empty message");
            return Err(DomainError::Transient("empty message".to_string()));
        }

        let request = self
            .request(Method::POST, &format!("/channels/{channel_id}/messages"))
            .json(&CreateMessage::from(message));
        let response = self
            .execute(
                request,
                Resource::Channel(channel_id),
                &[Resource::Channel(channel_id)],
            )
            .await?;
        let dto: MessageDto = response.json().await.map_err(transport_error)?;
        Ok(Message::new(dto.id, dto.channel_id))
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn add_reaction(&self, message: &Message, emoji: &str) -> PlatformResult<()> {
        self.send_empty(
            Method::PUT,
            &format!(
                "/channels/{}/messages/{}/reactions/{}/@me",
                message.channel_id,
                message.id,
                emoji_path(emoji)
            ),
            Resource::Message(message.id),
            &[
                Resource::Channel(message.channel_id),
                Resource::Message(message.id),
            ],
        )
        .await
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn delete_message(&self, message: &Message) -> PlatformResult<()> {
        self.send_empty(
            Method::DELETE,
            &format!("/channels/{}/messages/{}", message.channel_id, message.id),
            Resource::Message(message.id),
            &[
                Resource::Channel(message.channel_id),
                Resource::Message(message.id),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emoji_is_percent_encoded() {
        assert_eq!(emoji_path("✅"), "%E2%9C%85");
        assert_eq!(emoji_path("name:123"), "name%3A123");
    }

    #[test]
    fn test_base_url_normalized() {
        let client =
            DiscordClient::with_base_url("t", Duration::from_secs(1), "http://localhost/api/")
                .unwrap();
        assert_eq!(client.base_url, "http://localhost/api");
    }

    #[test]
    fn test_invalid_token_rejected() {
        let result = DiscordClient::new("bad\ntoken", Duration::from_secs(1));
        assert!(matches!(result, Err(DomainError::Configuration(_))));
    }
}
