//! Command dispatch
//!
//! Runs parsed commands against the services and turns every outcome,
//! including failures, into a reply in the invoking channel.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};
use warden_core::{DomainError, ErrorKind, OutgoingMessage, Snowflake};
use warden_discord::CommandMessage;
use warden_service::{
    ActivityCheckService, BanService, BanTarget, Outcome, ServiceContext, ServiceError,
};

use super::Command;

/// Routes operator commands to the services
pub struct Dispatcher {
    ctx: Arc<ServiceContext>,
    prefix: String,
}

impl Dispatcher {
    pub fn new(ctx: Arc<ServiceContext>, prefix: impl Into<String>) -> Self {
        Self {
            ctx,
            prefix: prefix.into(),
        }
    }

    /// Handle a posted message, replying in its channel when it was a command
    pub async fn handle(&self, message: &CommandMessage) {
        let Some(reply) = self.respond(message).await else {
            return;
        };

        let outgoing = OutgoingMessage::text(reply);
        if let Err(e) = self
            .ctx
            .platform()
            .post_message(message.channel_id, &outgoing)
            .await
        {
            warn!(channel_id = %message.channel_id, error = %e, "Failed to post command reply");
        }
    }

    /// Reply text for a message, or `None` when it is not a command for us
    #[instrument(skip(self, message), fields(message_id = %message.id, author = %message.author_id))]
    pub async fn respond(&self, message: &CommandMessage) -> Option<String> {
        if message.author_bot {
            return None;
        }
        let guild_id = message.guild_id?;

        let command = match Command::parse(&message.content, &self.prefix)? {
            Ok(command) => command,
            Err(usage) => return Some(usage.to_string()),
        };

        if !self.is_moderator(message) {
            info!(command = command.name(), "Rejected command from non-moderator");
            return Some("You need the moderator role to use this command.".to_string());
        }

        debug!(command = command.name(), "Running command");
        let reply = match self.run(guild_id, &command, message).await {
            Ok(reply) => reply,
            Err(e) => describe_failure(&command, &e),
        };
        Some(reply)
    }

    fn is_moderator(&self, message: &CommandMessage) -> bool {
        message
            .member_role_ids
            .contains(&self.ctx.moderation().moderator_role_id)
    }

    async fn run(
        &self,
        guild_id: Snowflake,
        command: &Command,
        message: &CommandMessage,
    ) -> Result<String, ServiceError> {
        match command {
            Command::Blacklist { target, reason } => {
                let username = message
                    .mentioned_name(*target)
                    .map_or_else(|| target.to_string(), str::to_string);
                let outcome = BanService::new(&self.ctx)
                    .ban(
                        guild_id,
                        BanTarget::new(*target, username),
                        reason.clone(),
                        &message.author_name,
                    )
                    .await?;
                Ok(format!(
                    "<@{}> has been blacklisted. Reason: {}\n{}",
                    outcome.entry.user_id,
                    outcome.entry.reason_or_default(),
                    outcome.role.describe()
                ))
            }
            Command::Unblacklist { target } => {
                let outcome = BanService::new(&self.ctx)
                    .unban(guild_id, *target, &message.author_name)
                    .await?;
                Ok(format!(
                    "<@{}> has been removed from the blacklist.\n{}",
                    outcome.entry.user_id,
                    outcome.role.describe()
                ))
            }
            Command::ActivityCheck => {
                let check = ActivityCheckService::new(&self.ctx)
                    .start_check(guild_id, Utc::now().timestamp())
                    .await?;
                Ok(format!(
                    "Activity check started in <#{}>. Results will be posted in {}.",
                    check.channel_id,
                    describe_window(self.ctx.activity().window_secs)
                ))
            }
            Command::EvaluateCheck => {
                let outcome = ActivityCheckService::new(&self.ctx)
                    .evaluate_latest(guild_id)
                    .await?;
                Ok(match outcome {
                    Outcome::Reported(report) if report.all_acknowledged() => {
                        "Activity check evaluated. Everyone acknowledged it.".to_string()
                    }
                    Outcome::Reported(report) => format!(
                        "Activity check evaluated. {} member(s) did not react.",
                        report.non_acknowledged.len()
                    ),
                    Outcome::Discarded => {
                        "The activity check message no longer exists, so the check was discarded."
                            .to_string()
                    }
                    Outcome::Absent => "There is no pending activity check.".to_string(),
                })
            }
        }
    }
}

/// User-facing text for a failed command
fn describe_failure(command: &Command, err: &ServiceError) -> String {
    match (err, err.kind()) {
        (ServiceError::Domain(DomainError::BanNotFound(id)), _) => {
            format!("<@{id}> is not blacklisted.")
        }
        (ServiceError::Domain(DomainError::NoPendingCheck(_)), _) => {
            "There is no pending activity check.".to_string()
        }
        (_, ErrorKind::NotFound) => format!("Not found: {err}"),
        (_, ErrorKind::Permission) => {
            warn!(command = command.name(), code = err.error_code(), error = %err, "Command lacked permissions");
            "I am missing the permissions needed to do that.".to_string()
        }
        (_, ErrorKind::Config) => {
            error!(command = command.name(), code = err.error_code(), error = %err, "Command hit a configuration problem");
            format!("The bot is misconfigured: {err}")
        }
        (_, ErrorKind::Transient) => {
            error!(command = command.name(), code = err.error_code(), error = %err, "Command failed");
            "Something went wrong while talking to Discord or the database. Try again shortly."
                .to_string()
        }
    }
}

fn describe_window(secs: i64) -> String {
    match secs {
        s if s % 3600 == 0 => format!("{} hour(s)", s / 3600),
        s if s % 60 == 0 => format!("{} minute(s)", s / 60),
        s => format!("{s} second(s)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_window() {
        assert_eq!(describe_window(86_400), "24 hour(s)");
        assert_eq!(describe_window(90), "90 second(s)");
        assert_eq!(describe_window(120), "2 minute(s)");
    }

    #[test]
    fn test_failures_map_to_user_text() {
        let cmd = Command::Unblacklist {
            target: Snowflake::new(7),
        };

        let err = ServiceError::from(DomainError::BanNotFound(Snowflake::new(7)));
        assert_eq!(describe_failure(&cmd, &err), "<@7> is not blacklisted.");

        let err = ServiceError::from(DomainError::NoPendingCheck(Snowflake::new(1)));
        assert_eq!(
            describe_failure(&Command::EvaluateCheck, &err),
            "There is no pending activity check."
        );

        let err = ServiceError::permission("cannot post");
        assert!(describe_failure(&cmd, &err).contains("missing the permissions"));

        let err = ServiceError::config("activity channel 100 not found");
        assert!(describe_failure(&cmd, &err).starts_with("The bot is misconfigured"));

        let err = ServiceError::from(DomainError::Transient("502".into()));
        assert!(describe_failure(&cmd, &err).contains("Try again"));
    }
}
