//! Gateway protocol definitions
//!
//! Op codes, the message envelope, payloads, close codes and intents of the
//! Discord gateway (v10, JSON encoding).

mod close_codes;
mod intents;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::CloseCode;
pub use intents::Intents;
pub use messages::GatewayMessage;
pub use opcodes::OpCode;
pub use payloads::{
    HelloPayload, IdentifyPayload, IdentifyProperties, ReadyPayload, ReadyUser, ResumePayload,
};
