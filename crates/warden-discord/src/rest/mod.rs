//! Discord REST API client
//!
//! Implements [`warden_core::Platform`] on top of API v10.

mod client;
mod error;
mod models;

pub use client::DiscordClient;
pub use error::{classify_status, ApiErrorBody, Resource};
pub use models::{
    ChannelDto, CreateMessage, EmbedDto, GatewayBotDto, GuildDto, MemberDto, MessageDto, RoleDto,
    UserDto,
};
