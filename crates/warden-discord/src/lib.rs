//! # warden-discord
//!
//! Discord adapter: a REST client implementing [`warden_core::Platform`]
//! and a gateway connection that turns dispatches into [`GatewayEvent`]s.

pub mod gateway;
pub mod protocol;
pub mod rest;

pub use gateway::{CommandMessage, GatewayClient, GatewayError, GatewayEvent, MentionedUser};
pub use protocol::Intents;
pub use rest::DiscordClient;
