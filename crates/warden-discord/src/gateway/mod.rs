//! Gateway connection and dispatch events

mod client;
mod events;

pub use client::{GatewayClient, GatewayError};
pub use events::{names, CommandMessage, GatewayEvent, MentionedUser};
