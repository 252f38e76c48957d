//! Ban service
//!
//! Persists blacklist entries and keeps the restriction role in sync with
//! them: on ban, on unban, and whenever a blacklisted member rejoins.

use tracing::{error, info, instrument, warn};
use warden_core::{BanEntry, DomainError, Embed, ErrorKind, Member, OutgoingMessage, Snowflake};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Member being blacklisted
#[derive(Debug, Clone)]
pub struct BanTarget {
    pub user_id: Snowflake,
    /// Display name recorded with the entry
    pub username: String,
}

impl BanTarget {
    pub fn new(user_id: Snowflake, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

/// What happened to the restriction role
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleAction {
    /// Role granted
    Applied,
    /// Role revoked
    Removed,
    /// Member present but did not hold the role
    NotHeld,
    /// Member is not in the guild; the role follows on rejoin
    MemberAbsent,
    /// The configured restriction role does not exist
    RoleUnresolved(Snowflake),
    /// The platform call failed
    Failed { kind: ErrorKind, reason: String },
}

impl RoleAction {
    /// Classify a failed grant or revoke
    fn from_error(err: &DomainError, role_id: Snowflake) -> Self {
        match err {
            DomainError::RoleNotFound(_) => Self::RoleUnresolved(role_id),
            DomainError::MemberNotFound(_) => Self::MemberAbsent,
            other => Self::Failed {
                kind: other.kind(),
                reason: other.to_string(),
            },
        }
    }

    /// Whether the role change went through
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Applied | Self::Removed | Self::NotHeld)
    }

    /// One-line description for operator feedback and log embeds
    pub fn describe(&self) -> String {
        match self {
            Self::Applied => "Restriction role applied.".to_string(),
            Self::Removed => "Restriction role removed.".to_string(),
            Self::NotHeld => "Member did not hold the restriction role.".to_string(),
            Self::MemberAbsent => {
                "Member is not on the server. The role will be applied when they return."
                    .to_string()
            }
            Self::RoleUnresolved(id) => format!("Restriction role {id} was not found."),
            Self::Failed {
                kind: ErrorKind::Permission,
                ..
            } => "Missing permission to change the restriction role.".to_string(),
            Self::Failed { reason, .. } => format!("Role change failed: {reason}"),
        }
    }
}

/// Result of a ban
#[derive(Debug, Clone)]
pub struct BanOutcome {
    pub entry: BanEntry,
    pub role: RoleAction,
}

/// Result of an unban
#[derive(Debug, Clone)]
pub struct UnbanOutcome {
    pub entry: BanEntry,
    pub role: RoleAction,
}

/// Result of processing a member join
#[derive(Debug, Clone)]
pub enum JoinOutcome {
    /// Member has no blacklist entry
    NotBlacklisted,
    /// Member is blacklisted; the role was (re)applied or the attempt failed
    Enforced { entry: BanEntry, role: RoleAction },
    /// The blacklist could not be consulted
    LookupFailed(String),
}

/// Ban service
pub struct BanService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BanService<'a> {
    /// Create a new BanService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Blacklist a member
    ///
    /// The entry is persisted first; role failures are reported in the
    /// outcome and never undo it.
    #[instrument(skip(self, reason), fields(user_id = %target.user_id))]
    pub async fn ban(
        &self,
        guild_id: Snowflake,
        target: BanTarget,
        reason: Option<String>,
        issued_by: &str,
    ) -> ServiceResult<BanOutcome> {
        let entry = BanEntry::new(target.user_id, target.username, reason, issued_by);
        self.ctx.ban_repo().upsert(&entry).await?;

        let role = self.apply_restriction(guild_id, entry.user_id).await;

        info!(
            user_id = %entry.user_id,
            banned_by = %entry.banned_by,
            role = ?role,
            "Member blacklisted"
        );

        let embed = Embed::new(
            "Member blacklisted",
            format!("<@{}> was added to the blacklist.", entry.user_id),
            Embed::RED,
        )
        .field("Reason", entry.reason_or_default(), false)
        .field("Moderator", &entry.banned_by, true)
        .field("Role", role.describe(), false)
        .footer(format!("User ID: {}", entry.user_id));
        self.notify(embed).await;

        Ok(BanOutcome { entry, role })
    }

    /// Lift a blacklist entry
    ///
    /// # Errors
    /// `BanNotFound` when the user has no entry; nothing is modified then
    #[instrument(skip(self))]
    pub async fn unban(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        issued_by: &str,
    ) -> ServiceResult<UnbanOutcome> {
        let entry = self
            .ctx
            .ban_repo()
            .find(user_id)
            .await?
            .ok_or(DomainError::BanNotFound(user_id))?;

        self.ctx.ban_repo().delete(user_id).await?;

        let role = self.lift_restriction(guild_id, user_id).await;

        info!(user_id = %user_id, issued_by = %issued_by, role = ?role, "Blacklist lifted");

        let embed = Embed::new(
            "Blacklist lifted",
            format!("<@{user_id}> was removed from the blacklist."),
            Embed::GREEN,
        )
        .field("Moderator", issued_by, true)
        .field("Role", role.describe(), false)
        .footer(format!("User ID: {user_id}"));
        self.notify(embed).await;

        Ok(UnbanOutcome { entry, role })
    }

    /// Every blacklist entry, newest first
    ///
    /// # Errors
    /// Database failures
    pub async fn entries(&self) -> ServiceResult<Vec<BanEntry>> {
        Ok(self.ctx.ban_repo().list().await?)
    }

    /// Re-apply the restriction role to a rejoining blacklisted member
    ///
    /// Never fails: every error is logged and reflected in the outcome.
    #[instrument(skip(self, member), fields(guild_id = %member.guild_id, user_id = %member.user_id))]
    pub async fn on_member_join(&self, member: &Member) -> JoinOutcome {
        let entry = match self.ctx.ban_repo().find(member.user_id).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return JoinOutcome::NotBlacklisted,
            Err(e) => {
                error!(error = %e, "Blacklist lookup failed for joining member");
                return JoinOutcome::LookupFailed(e.to_string());
            }
        };

        let role_id = self.ctx.moderation().blacklist_role_id;
        let role = match self
            .ctx
            .platform()
            .grant_role(member.guild_id, member.user_id, role_id)
            .await
        {
            Ok(()) => RoleAction::Applied,
            Err(e) => {
                warn!(error = %e, "Failed to re-apply restriction role");
                RoleAction::from_error(&e, role_id)
            }
        };

        info!(role = ?role, "Blacklisted member rejoined");

        let description = if role.succeeded() {
            format!(
                "{} rejoined the server and the restriction role was applied automatically.",
                member.mention()
            )
        } else {
            format!(
                "{} rejoined the server. {}",
                member.mention(),
                role.describe()
            )
        };
        let embed = Embed::new("Blacklisted member rejoined", description, Embed::DARK_RED)
            .field("Blacklist reason", entry.reason_or_default(), false)
            .footer(format!("User ID: {}", member.user_id));
        self.notify(embed).await;

        JoinOutcome::Enforced { entry, role }
    }

    async fn apply_restriction(&self, guild_id: Snowflake, user_id: Snowflake) -> RoleAction {
        let platform = self.ctx.platform();
        let role_id = self.ctx.moderation().blacklist_role_id;

        if let Err(e) = platform.resolve_role(guild_id, role_id).await {
            warn!(role_id = %role_id, error = %e, "Restriction role unavailable");
            return RoleAction::from_error(&e, role_id);
        }

        match platform.find_member(guild_id, user_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return RoleAction::MemberAbsent,
            Err(e) => return RoleAction::from_error(&e, role_id),
        }

        match platform.grant_role(guild_id, user_id, role_id).await {
            Ok(()) => RoleAction::Applied,
            Err(e) => {
                warn!(error = %e, "Failed to apply restriction role");
                RoleAction::from_error(&e, role_id)
            }
        }
    }

    async fn lift_restriction(&self, guild_id: Snowflake, user_id: Snowflake) -> RoleAction {
        let platform = self.ctx.platform();
        let role_id = self.ctx.moderation().blacklist_role_id;

        let member = match platform.find_member(guild_id, user_id).await {
            Ok(Some(member)) => member,
            Ok(None) => return RoleAction::MemberAbsent,
            Err(e) => return RoleAction::from_error(&e, role_id),
        };

        if !member.has_role(role_id) {
            return RoleAction::NotHeld;
        }

        match platform.revoke_role(guild_id, user_id, role_id).await {
            Ok(()) => RoleAction::Removed,
            Err(e) => {
                warn!(error = %e, "Failed to remove restriction role");
                RoleAction::from_error(&e, role_id)
            }
        }
    }

    /// Post to the log channel; failures are only logged
    async fn notify(&self, embed: Embed) {
        let channel_id = self.ctx.moderation().log_channel_id;
        if let Err(e) = self
            .ctx
            .platform()
            .post_message(channel_id, &OutgoingMessage::embed(embed))
            .await
        {
            warn!(channel_id = %channel_id, error = %e, "Failed to post log notification");
        }
    }
}
