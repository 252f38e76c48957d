//! In-memory fakes of the repository and platform traits

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use warden_common::{ActivityCheckConfig, ModerationConfig};
use warden_core::{
    BanEntry, BanRepository, Channel, DomainError, Guild, Member, Message, OutgoingMessage,
    PendingCheck, PendingCheckRepository, Platform, PlatformResult, RepoResult, Role, Snowflake,
};
use warden_service::ServiceContext;

pub const GUILD: Snowflake = Snowflake::new(1);
pub const ACTIVITY_CHANNEL: Snowflake = Snowflake::new(100);
pub const LOG_CHANNEL: Snowflake = Snowflake::new(101);
pub const ACTIVITY_ROLE: Snowflake = Snowflake::new(200);
pub const BLACKLIST_ROLE: Snowflake = Snowflake::new(201);
pub const MODERATOR_ROLE: Snowflake = Snowflake::new(202);
pub const EMOJI: &str = "✅";
pub const DAY: i64 = 86_400;
pub const NOW: i64 = 1_750_000_000;

pub fn id(n: i64) -> Snowflake {
    Snowflake::new(n)
}

// ============================================================================
// Repositories
// ============================================================================

#[derive(Default)]
pub struct InMemoryBans {
    entries: Mutex<HashMap<Snowflake, BanEntry>>,
    pub writes: AtomicUsize,
}

impl InMemoryBans {
    pub fn insert(&self, entry: BanEntry) {
        self.entries.lock().unwrap().insert(entry.user_id, entry);
    }

    pub fn get(&self, user_id: Snowflake) -> Option<BanEntry> {
        self.entries.lock().unwrap().get(&user_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl BanRepository for InMemoryBans {
    async fn find(&self, user_id: Snowflake) -> RepoResult<Option<BanEntry>> {
        Ok(self.get(user_id))
    }

    async fn upsert(&self, entry: &BanEntry) -> RepoResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.insert(entry.clone());
        Ok(())
    }

    async fn delete(&self, user_id: Snowflake) -> RepoResult<bool> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.lock().unwrap().remove(&user_id).is_some())
    }

    async fn list(&self) -> RepoResult<Vec<BanEntry>> {
        let mut entries: Vec<_> = self.entries.lock().unwrap().values().cloned().collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }
}

#[derive(Default)]
pub struct InMemoryChecks {
    checks: Mutex<HashMap<Snowflake, PendingCheck>>,
    delete_delay: Mutex<Option<Duration>>,
    pub list_calls: AtomicUsize,
}

impl InMemoryChecks {
    pub fn insert(&self, check: PendingCheck) {
        self.checks.lock().unwrap().insert(check.message_id, check);
    }

    pub fn contains(&self, message_id: Snowflake) -> bool {
        self.checks.lock().unwrap().contains_key(&message_id)
    }

    pub fn len(&self) -> usize {
        self.checks.lock().unwrap().len()
    }

    pub fn set_delete_delay(&self, delay: Duration) {
        *self.delete_delay.lock().unwrap() = Some(delay);
    }
}

#[async_trait]
impl PendingCheckRepository for InMemoryChecks {
    async fn create(&self, check: &PendingCheck) -> RepoResult<()> {
        self.insert(check.clone());
        Ok(())
    }

    async fn find(&self, message_id: Snowflake) -> RepoResult<Option<PendingCheck>> {
        Ok(self.checks.lock().unwrap().get(&message_id).cloned())
    }

    async fn list_overdue(&self, cutoff: i64) -> RepoResult<Vec<PendingCheck>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let mut due: Vec<_> = self
            .checks
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.started_at <= cutoff)
            .cloned()
            .collect();
        due.sort_by_key(|c| (c.started_at, c.message_id));
        Ok(due)
    }

    async fn latest_for_guild(&self, guild_id: Snowflake) -> RepoResult<Option<PendingCheck>> {
        Ok(self
            .checks
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.guild_id == guild_id)
            .max_by_key(|c| (c.started_at, c.message_id))
            .cloned())
    }

    async fn delete(&self, message_id: Snowflake) -> RepoResult<bool> {
        let delay = *self.delete_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.checks.lock().unwrap().remove(&message_id).is_some())
    }
}

// ============================================================================
// Platform
// ============================================================================

/// Platform operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ResolveGuild,
    ResolveChannel,
    ResolveRole,
    FetchMessage,
    ReactionUsers,
    RoleMembers,
    FindMember,
    Grant,
    Revoke,
    Post,
    AddReaction,
    DeleteMessage,
}

/// Failure to inject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Forbidden,
    Transient,
    /// Request refused for a reason other than a missing entity
    Rejected,
}

impl Failure {
    fn error(self, op: Op) -> DomainError {
        match self {
            Self::Forbidden => DomainError::Forbidden(format!("{op:?}")),
            Self::Transient => DomainError::Transient(format!("{op:?} timed out")),
            Self::Rejected => DomainError::Configuration(format!("{op:?} rejected")),
        }
    }
}

#[derive(Default)]
struct World {
    guilds: HashSet<Snowflake>,
    channels: HashSet<Snowflake>,
    roles: HashSet<Snowflake>,
    /// message id -> (channel id, reacting user ids)
    messages: HashMap<Snowflake, (Snowflake, HashSet<Snowflake>)>,
    members: HashMap<Snowflake, Member>,
    failures: HashMap<Op, Failure>,
    /// channel id, message
    posted: Vec<(Snowflake, OutgoingMessage)>,
    grants: Vec<(Snowflake, Snowflake)>,
    revokes: Vec<(Snowflake, Snowflake)>,
    reactions_added: Vec<(Snowflake, String)>,
    /// fetches that fail for one specific message
    failing_messages: HashMap<Snowflake, Failure>,
    fetch_delay: Option<Duration>,
    deleted: Vec<Snowflake>,
}

pub struct FakePlatform {
    world: Mutex<World>,
    next_message_id: AtomicI64,
    calls: AtomicUsize,
}

impl Default for FakePlatform {
    fn default() -> Self {
        let world = World {
            guilds: HashSet::from([GUILD]),
            channels: HashSet::from([ACTIVITY_CHANNEL, LOG_CHANNEL]),
            roles: HashSet::from([ACTIVITY_ROLE, BLACKLIST_ROLE, MODERATOR_ROLE]),
            ..World::default()
        };
        Self {
            world: Mutex::new(world),
            next_message_id: AtomicI64::new(10_000),
            calls: AtomicUsize::new(0),
        }
    }
}

impl FakePlatform {
    fn check(&self, op: Op) -> PlatformResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.world.lock().unwrap().failures.get(&op) {
            Some(failure) => Err(failure.error(op)),
            None => Ok(()),
        }
    }

    pub fn fail(&self, op: Op, failure: Failure) {
        self.world.lock().unwrap().failures.insert(op, failure);
    }

    pub fn heal(&self, op: Op) {
        self.world.lock().unwrap().failures.remove(&op);
    }

    pub fn fail_message(&self, message_id: Snowflake, failure: Failure) {
        self.world
            .lock()
            .unwrap()
            .failing_messages
            .insert(message_id, failure);
    }

    pub fn set_fetch_delay(&self, delay: Duration) {
        self.world.lock().unwrap().fetch_delay = Some(delay);
    }

    pub fn add_member(&self, user_id: Snowflake, roles: &[Snowflake]) {
        let member = Member::new(GUILD, user_id, format!("user{user_id}")).with_roles(roles.to_vec());
        self.world.lock().unwrap().members.insert(user_id, member);
    }

    pub fn remove_member(&self, user_id: Snowflake) {
        self.world.lock().unwrap().members.remove(&user_id);
    }

    pub fn member(&self, user_id: Snowflake) -> Option<Member> {
        self.world.lock().unwrap().members.get(&user_id).cloned()
    }

    pub fn remove_role(&self, role_id: Snowflake) {
        self.world.lock().unwrap().roles.remove(&role_id);
    }

    pub fn remove_channel(&self, channel_id: Snowflake) {
        self.world.lock().unwrap().channels.remove(&channel_id);
    }

    pub fn remove_guild(&self, guild_id: Snowflake) {
        self.world.lock().unwrap().guilds.remove(&guild_id);
    }

    /// Seed an existing announcement with reactions
    pub fn add_message(&self, message_id: Snowflake, channel_id: Snowflake, reacted: &[Snowflake]) {
        self.world
            .lock()
            .unwrap()
            .messages
            .insert(message_id, (channel_id, reacted.iter().copied().collect()));
    }

    pub fn remove_message(&self, message_id: Snowflake) {
        self.world.lock().unwrap().messages.remove(&message_id);
    }

    pub fn message_exists(&self, message_id: Snowflake) -> bool {
        self.world.lock().unwrap().messages.contains_key(&message_id)
    }

    pub fn posted(&self) -> Vec<(Snowflake, OutgoingMessage)> {
        self.world.lock().unwrap().posted.clone()
    }

    pub fn posted_to(&self, channel_id: Snowflake) -> Vec<OutgoingMessage> {
        self.posted()
            .into_iter()
            .filter(|(c, _)| *c == channel_id)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn grants(&self) -> Vec<(Snowflake, Snowflake)> {
        self.world.lock().unwrap().grants.clone()
    }

    pub fn revokes(&self) -> Vec<(Snowflake, Snowflake)> {
        self.world.lock().unwrap().revokes.clone()
    }

    pub fn reactions_added(&self) -> Vec<(Snowflake, String)> {
        self.world.lock().unwrap().reactions_added.clone()
    }

    /// Messages deleted through the platform
    pub fn deleted(&self) -> Vec<Snowflake> {
        self.world.lock().unwrap().deleted.clone()
    }

    /// Platform calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn resolve_guild(&self, guild_id: Snowflake) -> PlatformResult<Guild> {
        self.check(Op::ResolveGuild)?;
        if self.world.lock().unwrap().guilds.contains(&guild_id) {
            Ok(Guild::new(guild_id, "Test Guild"))
        } else {
            Err(DomainError::GuildNotFound(guild_id))
        }
    }

    async fn resolve_channel(
        &self,
        guild_id: Snowflake,
        channel_id: Snowflake,
    ) -> PlatformResult<Channel> {
        self.check(Op::ResolveChannel)?;
        if self.world.lock().unwrap().channels.contains(&channel_id) {
            Ok(Channel::new(channel_id, guild_id, "channel"))
        } else {
            Err(DomainError::ChannelNotFound(channel_id))
        }
    }

    async fn resolve_role(&self, guild_id: Snowflake, role_id: Snowflake) -> PlatformResult<Role> {
        self.check(Op::ResolveRole)?;
        if self.world.lock().unwrap().roles.contains(&role_id) {
            Ok(Role::new(role_id, guild_id, "role"))
        } else {
            Err(DomainError::RoleNotFound(role_id))
        }
    }

    async fn fetch_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> PlatformResult<Message> {
        self.check(Op::FetchMessage)?;
        let delay = self.world.lock().unwrap().fetch_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let world = self.world.lock().unwrap();
        if let Some(failure) = world.failing_messages.get(&message_id) {
            return Err(failure.error(Op::FetchMessage));
        }
        match world.messages.get(&message_id) {
            Some((channel, _)) if *channel == channel_id => Ok(Message::new(message_id, channel_id)),
            _ => Err(DomainError::MessageNotFound(message_id)),
        }
    }

    async fn reaction_users(
        &self,
        message: &Message,
        _emoji: &str,
    ) -> PlatformResult<HashSet<Snowflake>> {
        self.check(Op::ReactionUsers)?;
        let world = self.world.lock().unwrap();
        world
            .messages
            .get(&message.id)
            .map(|(_, users)| {
                users
                    .iter()
                    .copied()
                    .filter(|u| world.members.get(u).map_or(true, |m| !m.bot))
                    .collect()
            })
            .ok_or(DomainError::MessageNotFound(message.id))
    }

    async fn role_members(&self, role: &Role) -> PlatformResult<HashSet<Snowflake>> {
        self.check(Op::RoleMembers)?;
        let world = self.world.lock().unwrap();
        Ok(world
            .members
            .values()
            .filter(|m| m.has_role(role.id))
            .map(|m| m.user_id)
            .collect())
    }

    async fn find_member(
        &self,
        _guild_id: Snowflake,
        user_id: Snowflake,
    ) -> PlatformResult<Option<Member>> {
        self.check(Op::FindMember)?;
        Ok(self.member(user_id))
    }

    async fn grant_role(
        &self,
        _guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> PlatformResult<()> {
        self.check(Op::Grant)?;
        let mut world = self.world.lock().unwrap();
        world.grants.push((user_id, role_id));
        if !world.roles.contains(&role_id) {
            return Err(DomainError::RoleNotFound(role_id));
        }
        match world.members.get_mut(&user_id) {
            Some(member) => {
                if !member.role_ids.contains(&role_id) {
                    member.role_ids.push(role_id);
                }
                Ok(())
            }
            None => Err(DomainError::MemberNotFound(user_id)),
        }
    }

    async fn revoke_role(
        &self,
        _guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> PlatformResult<()> {
        self.check(Op::Revoke)?;
        let mut world = self.world.lock().unwrap();
        world.revokes.push((user_id, role_id));
        match world.members.get_mut(&user_id) {
            Some(member) => {
                member.role_ids.retain(|r| *r != role_id);
                Ok(())
            }
            None => Err(DomainError::MemberNotFound(user_id)),
        }
    }

    async fn post_message(
        &self,
        channel_id: Snowflake,
        message: &OutgoingMessage,
    ) -> PlatformResult<Message> {
        self.check(Op::Post)?;
        let mut world = self.world.lock().unwrap();
        if !world.channels.contains(&channel_id) {
            return Err(DomainError::ChannelNotFound(channel_id));
        }
        let id = Snowflake::new(self.next_message_id.fetch_add(1, Ordering::SeqCst));
        world.messages.insert(id, (channel_id, HashSet::new()));
        world.posted.push((channel_id, message.clone()));
        Ok(Message::new(id, channel_id))
    }

    async fn add_reaction(&self, message: &Message, emoji: &str) -> PlatformResult<()> {
        self.check(Op::AddReaction)?;
        self.world
            .lock()
            .unwrap()
            .reactions_added
            .push((message.id, emoji.to_string()));
        Ok(())
    }

    async fn delete_message(&self, message: &Message) -> PlatformResult<()> {
        self.check(Op::DeleteMessage)?;
        let mut world = self.world.lock().unwrap();
        world.messages.remove(&message.id);
        world.deleted.push(message.id);
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub bans: Arc<InMemoryBans>,
    pub checks: Arc<InMemoryChecks>,
    pub platform: Arc<FakePlatform>,
    pub ctx: Arc<ServiceContext>,
}

pub fn moderation() -> ModerationConfig {
    ModerationConfig {
        blacklist_role_id: BLACKLIST_ROLE,
        log_channel_id: LOG_CHANNEL,
        moderator_role_id: MODERATOR_ROLE,
    }
}

pub fn activity() -> ActivityCheckConfig {
    ActivityCheckConfig {
        channel_id: ACTIVITY_CHANNEL,
        role_id: ACTIVITY_ROLE,
        window_secs: DAY,
        tick_secs: 3_600,
        timeout_secs: 60,
        emoji: EMOJI.to_string(),
    }
}

pub fn harness() -> Harness {
    let bans = Arc::new(InMemoryBans::default());
    let checks = Arc::new(InMemoryChecks::default());
    let platform = Arc::new(FakePlatform::default());

    let ctx = ServiceContext::builder()
        .ban_repo(bans.clone())
        .check_repo(checks.clone())
        .platform(platform.clone())
        .moderation(moderation())
        .activity(activity())
        .build()
        .unwrap();

    Harness {
        bans,
        checks,
        platform,
        ctx: Arc::new(ctx),
    }
}

impl Harness {
    /// Seed an announcement and its pending record
    pub fn seed_check(&self, message_id: Snowflake, started_at: i64, reacted: &[Snowflake]) {
        self.platform.add_message(message_id, ACTIVITY_CHANNEL, reacted);
        self.checks.insert(PendingCheck::new(
            message_id,
            GUILD,
            ACTIVITY_CHANNEL,
            ACTIVITY_ROLE,
            started_at,
        ));
    }

    /// Text of every message posted to the activity channel
    pub fn activity_posts(&self) -> Vec<String> {
        self.platform
            .posted_to(ACTIVITY_CHANNEL)
            .into_iter()
            .filter_map(|m| m.content)
            .collect()
    }
}
