use std::{
    collections::{BTreeSet, HashSet},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use serenity::all::{ChannelId, GuildId, MessageId, RoleId, UserId};
use tokio::sync::Notify;

use crate::{
    error::{Error, Result},
    gateway::{Gateway, MessagePayload},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Eligible(GuildId),
    Send(ChannelId, MessagePayload),
    Fetch(ChannelId, MessageId),
    Edit(ChannelId, MessageId),
    Find(ChannelId, String),
    Grant(UserId, RoleId),
    Revoke(UserId, RoleId),
}

/// Parks the next `send` or `edit` until released.
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

/// In-memory chat platform. Every message it hands out stays "live" until
/// [`MockGateway::delete`] is called.
#[derive(Default)]
pub struct MockGateway {
    channels: Mutex<Vec<ChannelId>>,
    live: Mutex<HashSet<MessageId>>,
    own_embeds: Mutex<Vec<(ChannelId, MessageId, String)>>,
    failing: Mutex<HashSet<ChannelId>>,
    deleted_channels: Mutex<HashSet<ChannelId>>,
    missing_roles: Mutex<HashSet<RoleId>>,
    gate: Mutex<Option<Gate>>,
    next_id: AtomicU64,
    calls: Mutex<Vec<Call>>,
}

impl MockGateway {
    pub fn with_channels(channels: &[u64]) -> Arc<Self> {
        let gateway = Self {
            next_id: AtomicU64::new(1000),
            ..Default::default()
        };
        *gateway.channels.lock().unwrap() = channels.iter().copied().map(ChannelId::new).collect();
        Arc::new(gateway)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn sends(&self) -> Vec<(ChannelId, MessagePayload)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Send(channel, payload) => Some((channel, payload)),
                _ => None,
            })
            .collect()
    }

    pub fn is_live(&self, message_id: MessageId) -> bool {
        self.live.lock().unwrap().contains(&message_id)
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    pub fn delete(&self, message_id: MessageId) {
        self.live.lock().unwrap().remove(&message_id);
    }

    pub fn fail_sends_to(&self, channel: u64) {
        self.failing.lock().unwrap().insert(ChannelId::new(channel));
    }

    pub fn delete_channel(&self, channel: ChannelId) {
        self.deleted_channels.lock().unwrap().insert(channel);
    }

    pub fn remove_role(&self, role: RoleId) {
        self.missing_roles.lock().unwrap().insert(role);
    }

    pub fn plant_own_embed(&self, channel: ChannelId, title: &str) -> MessageId {
        let id = self.allocate();
        self.own_embeds
            .lock()
            .unwrap()
            .push((channel, id, title.to_string()));
        id
    }

    pub fn set_gate(&self) -> (Arc<Notify>, Arc<Notify>) {
        let gate = Gate {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        };
        let handles = (gate.entered.clone(), gate.release.clone());
        *self.gate.lock().unwrap() = Some(gate);
        handles
    }

    fn allocate(&self) -> MessageId {
        let id = MessageId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.live.lock().unwrap().insert(id);
        id
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn channel_exists(&self, channel_id: ChannelId) -> Result<()> {
        if self.deleted_channels.lock().unwrap().contains(&channel_id) {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    async fn pass_gate(&self) {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn eligible_destinations(
        &self,
        guild_id: GuildId,
        excluded: &BTreeSet<ChannelId>,
        stats_channel: ChannelId,
    ) -> Result<Vec<ChannelId>> {
        self.record(Call::Eligible(guild_id));
        Ok(self
            .channels
            .lock()
            .unwrap()
            .iter()
            .copied()
            .filter(|channel| *channel != stats_channel && !excluded.contains(channel))
            .collect())
    }

    async fn send(&self, channel_id: ChannelId, payload: &MessagePayload) -> Result<MessageId> {
        self.record(Call::Send(channel_id, payload.clone()));
        self.pass_gate().await;
        self.channel_exists(channel_id)?;

        if self.failing.lock().unwrap().contains(&channel_id) {
            return Err(Error::Send {
                channel: channel_id,
                reason: "Missing Permissions".to_string(),
            });
        }

        Ok(self.allocate())
    }

    async fn fetch_message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<()> {
        self.record(Call::Fetch(channel_id, message_id));
        self.channel_exists(channel_id)?;
        if self.is_live(message_id) {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    async fn edit(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        _payload: &MessagePayload,
    ) -> Result<()> {
        self.record(Call::Edit(channel_id, message_id));
        self.pass_gate().await;
        self.channel_exists(channel_id)?;

        if self.is_live(message_id) {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    async fn find_own_embed(&self, channel_id: ChannelId, title: &str) -> Result<Option<MessageId>> {
        self.record(Call::Find(channel_id, title.to_string()));
        self.channel_exists(channel_id)?;
        Ok(self
            .own_embeds
            .lock()
            .unwrap()
            .iter()
            .find(|(channel, id, t)| *channel == channel_id && t == title && self.is_live(*id))
            .map(|(_, id, _)| *id))
    }

    async fn grant_role(&self, _guild_id: GuildId, user_id: UserId, role_id: RoleId) -> Result<()> {
        self.record(Call::Grant(user_id, role_id));
        if self.missing_roles.lock().unwrap().contains(&role_id) {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    async fn revoke_role(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<()> {
        self.record(Call::Revoke(user_id, role_id));
        if self.missing_roles.lock().unwrap().contains(&role_id) {
            return Err(Error::NotFound);
        }
        Ok(())
    }
}

pub const GUILD: GuildId = GuildId::new(1);
pub const STATS_CHANNEL: ChannelId = ChannelId::new(10);
pub const ROLE: RoleId = RoleId::new(20);

/// A store in a throwaway directory with [`GUILD`] pointed at [`STATS_CHANNEL`] and [`ROLE`].
pub async fn configured_store() -> (tempfile::TempDir, Arc<pingbot_storage::ConfigStore>) {
    let dir = tempfile::tempdir().unwrap();
    let store = pingbot_storage::ConfigStore::open(pingbot_storage::Storage::new(dir.path())).await;
    store
        .update(GUILD, |config| config.set_targets(STATS_CHANNEL, ROLE))
        .await
        .unwrap();
    (dir, Arc::new(store))
}
