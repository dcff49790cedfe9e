use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};

use log::{error, info, warn};
use pingbot_stats::RateSnapshot;
use pingbot_storage::{ConfigStore, EmbedStyle};
use serenity::all::{ChannelId, GuildId, MessageId};

use crate::{
    error::{Error, Result},
    gateway::Gateway,
    render,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Edited(MessageId),
    Created(MessageId),
    /// The previous message was gone, so a replacement was posted in the same tick.
    Recreated { stale: MessageId, created: MessageId },
    /// Another upsert was still talking to the gateway.
    Skipped,
}

/// Owns the single stats message of one guild and keeps it current.
pub struct StatsPublisher {
    guild_id: GuildId,
    channel_id: ChannelId,
    gateway: Arc<dyn Gateway>,
    store: Arc<ConfigStore>,
    refresh_every: Duration,
    handle: Mutex<Option<MessageId>>,
    in_flight: AtomicBool,
}

impl StatsPublisher {
    pub fn new(
        guild_id: GuildId,
        channel_id: ChannelId,
        handle: Option<MessageId>,
        gateway: Arc<dyn Gateway>,
        store: Arc<ConfigStore>,
        refresh_every: Duration,
    ) -> Self {
        Self {
            guild_id,
            channel_id,
            gateway,
            store,
            refresh_every,
            handle: Mutex::new(handle),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn handle(&self) -> Option<MessageId> {
        *self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_handle(&self, handle: Option<MessageId>) {
        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = handle;
    }

    /// Validates the stored handle, or looks for an earlier stats message of ours
    /// when there is none.
    pub async fn recover(&self, title: &str) -> Result<Option<MessageId>> {
        if let Some(message_id) = self.handle() {
            match self.gateway.fetch_message(self.channel_id, message_id).await {
                Ok(()) => return Ok(Some(message_id)),
                Err(Error::NotFound) => {
                    warn!("Stored stats message {message_id} in guild {} is gone", self.guild_id);
                    self.set_handle(None);
                }
                Err(why) => return Err(why),
            }
        }

        let found = self.gateway.find_own_embed(self.channel_id, title).await?;
        if let Some(message_id) = found {
            info!("Adopted stats message {message_id} in guild {}", self.guild_id);
            self.set_handle(Some(message_id));
            self.persist(message_id).await;
        }

        Ok(found)
    }

    /// Edits the current stats message, or posts a new one if there is none or
    /// the old one was deleted. Concurrent calls are dropped, not queued.
    pub async fn upsert(&self, snapshot: &RateSnapshot, style: &EmbedStyle) -> Result<UpsertOutcome> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            return Ok(UpsertOutcome::Skipped);
        };

        let payload = render::stats_message(snapshot, style, self.refresh_every);
        let mut stale = None;

        if let Some(message_id) = self.handle() {
            match self.gateway.edit(self.channel_id, message_id, &payload).await {
                Ok(()) => return Ok(UpsertOutcome::Edited(message_id)),
                Err(Error::NotFound) => {
                    warn!(
                        "Stats message {message_id} in guild {} is gone, posting a new one",
                        self.guild_id
                    );
                    self.set_handle(None);
                    stale = Some(message_id);
                }
                Err(why) => return Err(why),
            }
        }

        let created = self.gateway.send(self.channel_id, &payload).await?;
        self.set_handle(Some(created));
        self.persist(created).await;

        Ok(match stale {
            Some(stale) => UpsertOutcome::Recreated { stale, created },
            None => UpsertOutcome::Created(created),
        })
    }

    /// Writes the handle back unless the guild has since moved its stats channel.
    async fn persist(&self, message_id: MessageId) {
        let channel_id = self.channel_id;
        let result = self
            .store
            .update(self.guild_id, |config| {
                if config.target_channel_id == Some(channel_id) {
                    config.stats_message_id = Some(message_id);
                }
            })
            .await;

        if let Err(why) = result {
            error!("{why:#}");
        }
    }
}

struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
