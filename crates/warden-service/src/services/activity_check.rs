//! Activity check service
//!
//! Posts activity check announcements and evaluates them once the waiting
//! window has elapsed. A pending check is reported and deleted, discarded
//! when something it references is gone, or kept for the next pass on any
//! other failure.

use tokio::sync::MutexGuard;
use tracing::{error, info, instrument, warn};
use warden_core::{
    non_acknowledged, overdue_cutoff, DomainError, ErrorKind, OutgoingMessage, PendingCheck, Role,
    Snowflake,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Result of evaluating a single pending check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Report posted and record deleted
    Reported(CheckReport),
    /// A referenced resource vanished; record deleted without a report
    Discarded,
    /// No record under that key
    Absent,
}

/// Evaluation result that was posted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub message_id: Snowflake,
    pub role_id: Snowflake,
    /// Members holding the role who did not react, ascending
    pub non_acknowledged: Vec<Snowflake>,
}

impl CheckReport {
    /// Whether every remaining role member acknowledged
    pub fn all_acknowledged(&self) -> bool {
        self.non_acknowledged.is_empty()
    }
}

/// Counts from one evaluation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationSummary {
    pub reported: usize,
    pub discarded: usize,
    /// Left in place after a non-NotFound failure
    pub retained: usize,
}

impl EvaluationSummary {
    pub fn total(&self) -> usize {
        self.reported + self.discarded + self.retained
    }
}

/// Activity check service
pub struct ActivityCheckService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ActivityCheckService<'a> {
    /// Create a new ActivityCheckService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Post an announcement in the activity channel and record it as pending
    ///
    /// No record is written unless both the post and the reaction succeed.
    /// An announcement whose reaction fails is deleted again.
    ///
    /// # Errors
    /// - `Config` when the activity channel or role cannot be resolved
    /// - `Permission` when the platform refuses to post or react
    /// - `Domain` for transient platform and database failures
    #[instrument(skip(self))]
    pub async fn start_check(&self, guild_id: Snowflake, now: i64) -> ServiceResult<PendingCheck> {
        let settings = self.ctx.activity();
        let platform = self.ctx.platform();

        let channel = platform
            .resolve_channel(guild_id, settings.channel_id)
            .await
            .map_err(|e| config_error(e, "activity channel", settings.channel_id))?;
        let role = platform
            .resolve_role(guild_id, settings.role_id)
            .await
            .map_err(|e| config_error(e, "activity role", settings.role_id))?;

        let message = platform
            .post_message(channel.id, &announcement(&role, &settings.emoji))
            .await
            .map_err(|e| permission_error(e, "post in the activity channel"))?;

        if let Err(e) = platform.add_reaction(&message, &settings.emoji).await {
            match platform.delete_message(&message).await {
                Ok(()) => warn!(
                    message_id = %message.id,
                    error = %e,
                    "Announcement withdrawn after its reaction failed"
                ),
                Err(cleanup) => error!(
                    message_id = %message.id,
                    error = %e,
                    cleanup_error = %cleanup,
                    "Announcement left without its reaction and could not be withdrawn"
                ),
            }
            return Err(permission_error(e, "react in the activity channel"));
        }

        let check = PendingCheck::new(message.id, guild_id, channel.id, role.id, now);
        if let Err(e) = self.ctx.check_repo().create(&check).await {
            error!(
                message_id = %message.id,
                error = %e,
                "Announcement posted but the pending check could not be stored"
            );
            return Err(e.into());
        }

        info!(
            message_id = %check.message_id,
            channel_id = %check.channel_id,
            role_id = %check.role_id,
            "Activity check started"
        );

        Ok(check)
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Evaluate every check whose waiting window has elapsed
    ///
    /// Waits for any evaluation already in progress.
    ///
    /// # Errors
    /// Only when the overdue checks cannot be listed; per-check failures
    /// are counted in the summary
    pub async fn run_once(&self, now: i64) -> ServiceResult<EvaluationSummary> {
        let guard = self.ctx.evaluation_lock().lock().await;
        self.run_locked(now, guard).await
    }

    /// Like [`Self::run_once`], but returns `Ok(None)` instead of waiting
    /// when another evaluation holds the lock
    ///
    /// # Errors
    /// Only when the overdue checks cannot be listed
    pub async fn try_run_once(&self, now: i64) -> ServiceResult<Option<EvaluationSummary>> {
        let Ok(guard) = self.ctx.evaluation_lock().try_lock() else {
            return Ok(None);
        };
        self.run_locked(now, guard).await.map(Some)
    }

    /// Evaluate a single pending check by announcement message ID
    ///
    /// # Errors
    /// Transient, permission and database failures; the record is kept
    #[instrument(skip(self))]
    pub async fn evaluate(&self, message_id: Snowflake) -> ServiceResult<Outcome> {
        let _guard = self.ctx.evaluation_lock().lock().await;

        match self.ctx.check_repo().find(message_id).await? {
            Some(check) => self.evaluate_check(&check).await,
            None => Ok(Outcome::Absent),
        }
    }

    /// Evaluate the most recent pending check of a guild, regardless of age
    ///
    /// # Errors
    /// `NoPendingCheck` when the guild has none, otherwise as [`Self::evaluate`]
    #[instrument(skip(self))]
    pub async fn evaluate_latest(&self, guild_id: Snowflake) -> ServiceResult<Outcome> {
        let _guard = self.ctx.evaluation_lock().lock().await;

        let check = self
            .ctx
            .check_repo()
            .latest_for_guild(guild_id)
            .await?
            .ok_or(DomainError::NoPendingCheck(guild_id))?;

        self.evaluate_check(&check).await
    }

    async fn run_locked(
        &self,
        now: i64,
        _guard: MutexGuard<'_, ()>,
    ) -> ServiceResult<EvaluationSummary> {
        let window = self.ctx.activity().window_secs;
        let due = self
            .ctx
            .check_repo()
            .list_overdue(overdue_cutoff(now, window))
            .await?;

        let mut summary = EvaluationSummary::default();
        for check in due.iter().filter(|c| c.is_overdue(now, window)) {
            match self.evaluate_check(check).await {
                Ok(Outcome::Reported(_)) => summary.reported += 1,
                Ok(Outcome::Discarded | Outcome::Absent) => summary.discarded += 1,
                Err(e) => {
                    warn!(
                        message_id = %check.message_id,
                        code = e.error_code(),
                        error = %e,
                        "Activity check evaluation failed; will retry next pass"
                    );
                    summary.retained += 1;
                }
            }
        }

        if summary.total() > 0 {
            info!(
                reported = summary.reported,
                discarded = summary.discarded,
                retained = summary.retained,
                "Evaluation pass finished"
            );
        }

        Ok(summary)
    }

    /// Resolve under the time limit, then post and delete unbounded
    ///
    /// A posted report is always followed by the record delete.
    async fn evaluate_check(&self, check: &PendingCheck) -> ServiceResult<Outcome> {
        let limit = self.ctx.activity().check_timeout();
        let Ok(tally) = tokio::time::timeout(limit, self.tally(check)).await else {
            return Err(ServiceError::timeout(format!(
                "evaluating check {} took longer than {}s",
                check.message_id,
                limit.as_secs()
            )));
        };

        let posted = match tally {
            Ok(tally) => self.post_report(check, tally).await,
            Err(e) => Err(e),
        };

        match posted {
            Ok(report) => {
                self.ctx.check_repo().delete(check.message_id).await?;
                info!(
                    message_id = %check.message_id,
                    non_acknowledged = report.non_acknowledged.len(),
                    "Activity check reported"
                );
                Ok(Outcome::Reported(report))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.ctx.check_repo().delete(check.message_id).await?;
                warn!(
                    message_id = %check.message_id,
                    reason = %e,
                    "Activity check discarded"
                );
                Ok(Outcome::Discarded)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Collect the role members who did not react
    ///
    /// The role listing only contains current guild members, so anyone who
    /// left since the announcement is already absent from it.
    async fn tally(&self, check: &PendingCheck) -> Result<Tally, DomainError> {
        let platform = self.ctx.platform();

        platform.resolve_guild(check.guild_id).await?;
        let channel = platform
            .resolve_channel(check.guild_id, check.channel_id)
            .await?;
        let message = platform.fetch_message(channel.id, check.message_id).await?;
        let acknowledged = platform
            .reaction_users(&message, &self.ctx.activity().emoji)
            .await?;
        let role = platform.resolve_role(check.guild_id, check.role_id).await?;
        let members = platform.role_members(&role).await?;

        let mut missing: Vec<Snowflake> = non_acknowledged(&members, &acknowledged)
            .into_iter()
            .collect();
        missing.sort_unstable();

        Ok(Tally {
            channel_id: channel.id,
            role,
            non_acknowledged: missing,
        })
    }

    async fn post_report(
        &self,
        check: &PendingCheck,
        tally: Tally,
    ) -> Result<CheckReport, DomainError> {
        let emoji = &self.ctx.activity().emoji;
        self.ctx
            .platform()
            .post_message(
                tally.channel_id,
                &report_message(&tally.role, &tally.non_acknowledged, emoji),
            )
            .await?;

        Ok(CheckReport {
            message_id: check.message_id,
            role_id: tally.role.id,
            non_acknowledged: tally.non_acknowledged,
        })
    }
}

/// Resolved state of a check, ready to be reported
struct Tally {
    channel_id: Snowflake,
    role: Role,
    non_acknowledged: Vec<Snowflake>,
}

/// Announcement posted when a check starts
fn announcement(role: &Role, emoji: &str) -> OutgoingMessage {
    OutgoingMessage::text(format!(
        "{}\n# ACTIVITY CHECK\n\nReact with {emoji} to confirm you are active.",
        role.mention()
    ))
}

/// Evaluation report posted to the check's channel
fn report_message(role: &Role, non_acknowledged: &[Snowflake], emoji: &str) -> OutgoingMessage {
    if non_acknowledged.is_empty() {
        return OutgoingMessage::text(format!(
            "**Activity check result:**\nEveryone with {} reacted with {emoji}. Great job!",
            role.mention()
        ));
    }

    let mentions: Vec<String> = non_acknowledged.iter().map(|id| format!("<@{id}>")).collect();
    OutgoingMessage::text(format!(
        "**Activity check result:**\nThese members with {} did not react with {emoji}:\n\n{}",
        role.mention(),
        mentions.join("\n")
    ))
}

fn config_error(err: DomainError, what: &str, id: Snowflake) -> ServiceError {
    if err.is_not_found() {
        ServiceError::config(format!("{what} {id} not found"))
    } else {
        err.into()
    }
}

fn permission_error(err: DomainError, action: &str) -> ServiceError {
    if err.is_forbidden() {
        ServiceError::permission(format!("cannot {action}"))
    } else {
        err.into()
    }
}
