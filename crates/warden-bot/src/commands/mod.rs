//! Operator commands
//!
//! Prefix commands read from guild text channels. [`Command::parse`] turns a
//! message into a command; [`Dispatcher`] checks permissions and runs it.

mod dispatch;

pub use dispatch::Dispatcher;

use warden_core::Snowflake;

/// Parsed operator command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `blacklist|blist <@user|id> [reason…]`
    Blacklist {
        target: Snowflake,
        reason: Option<String>,
    },
    /// `unblacklist|unblist <@user|id>`
    Unblacklist { target: Snowflake },
    /// `activitycheck|ac`
    ActivityCheck,
    /// `evaluatecheck|checkac`
    EvaluateCheck,
}

/// A recognised command with bad arguments
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Usage: {prefix}{usage}")]
pub struct UsageError {
    pub prefix: String,
    pub usage: &'static str,
}

const BLACKLIST_USAGE: &str = "blacklist <@user|id> [reason]";
const UNBLACKLIST_USAGE: &str = "unblacklist <@user|id>";

impl Command {
    /// Parse message content
    ///
    /// Returns `None` when the content is not a known command.
    pub fn parse(content: &str, prefix: &str) -> Option<Result<Self, UsageError>> {
        let body = content.trim_start().strip_prefix(prefix)?;
        let mut parts = body.splitn(2, char::is_whitespace);
        let name = parts.next()?.to_ascii_lowercase();
        let rest = parts.next().unwrap_or("").trim();

        let usage = |text: &'static str| UsageError {
            prefix: prefix.to_string(),
            usage: text,
        };

        let command = match name.as_str() {
            "blacklist" | "blist" => {
                let (target, reason) = split_target(rest);
                match target.map(Snowflake::parse_user_mention) {
                    Some(Ok(target)) => Ok(Self::Blacklist {
                        target,
                        reason: reason.map(str::to_string),
                    }),
                    _ => Err(usage(BLACKLIST_USAGE)),
                }
            }
            "unblacklist" | "unblist" => {
                let (target, extra) = split_target(rest);
                match (target.map(Snowflake::parse_user_mention), extra) {
                    (Some(Ok(target)), None) => Ok(Self::Unblacklist { target }),
                    _ => Err(usage(UNBLACKLIST_USAGE)),
                }
            }
            "activitycheck" | "ac" => Ok(Self::ActivityCheck),
            "evaluatecheck" | "checkac" => Ok(Self::EvaluateCheck),
            _ => return None,
        };

        Some(command)
    }

    /// Command name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Blacklist { .. } => "blacklist",
            Self::Unblacklist { .. } => "unblacklist",
            Self::ActivityCheck => "activitycheck",
            Self::EvaluateCheck => "evaluatecheck",
        }
    }
}

/// First word and the trimmed remainder, if any
fn split_target(args: &str) -> (Option<&str>, Option<&str>) {
    let mut parts = args.splitn(2, char::is_whitespace);
    let target = parts.next().filter(|t| !t.is_empty());
    let rest = parts.next().map(str::trim).filter(|r| !r.is_empty());
    (target, rest)
}
