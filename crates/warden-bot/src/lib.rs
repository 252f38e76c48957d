//! # warden-bot
//!
//! Process wiring: configuration, database, Discord adapter, services, the
//! evaluation ticker and the gateway event loop.

pub mod app;
pub mod commands;

pub use app::run;
pub use commands::{Command, Dispatcher, UsageError};
