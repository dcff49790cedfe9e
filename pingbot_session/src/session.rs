use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use pingbot_stats::RateSnapshot;
use pingbot_storage::ConfigStore;
use serenity::all::{GuildId, MessageId};
use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use crate::{
    emitter::{EmitOutcome, PingEmitter},
    error::{Error, Result},
    gateway::Gateway,
    lock_counter,
    publisher::{StatsPublisher, UpsertOutcome},
    render, roles, SharedCounter,
};

/// Cadences of the per-guild periodic tasks.
#[derive(Debug, Clone, Copy)]
pub struct Timings {
    pub ping_interval: Duration,
    pub stats_interval: Duration,
    pub recompute_interval: Duration,
    pub prune_interval: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(120),
            stats_interval: Duration::from_secs(60),
            recompute_interval: Duration::from_secs(1),
            prune_interval: Duration::from_secs(3600),
        }
    }
}

/// The running tasks of one guild. Dropping the session cancels them.
pub struct GuildSession {
    guild_id: GuildId,
    counter: SharedCounter,
    publisher: Arc<StatsPublisher>,
    started_at: DateTime<Utc>,
    tasks: Vec<JoinHandle<()>>,
}

impl GuildSession {
    /// Recovers the guild's messages and spawns its emitter, tracker and
    /// publisher tasks. Fails with [`Error::ConfigurationMissing`] before doing
    /// anything if the guild has no target channel or role, and with
    /// [`Error::NotFound`] or [`Error::GuildUnavailable`] without spawning
    /// anything if the statistics channel or the guild cannot be reached.
    pub async fn start(
        guild_id: GuildId,
        gateway: Arc<dyn Gateway>,
        store: Arc<ConfigStore>,
        counter: SharedCounter,
        timings: Timings,
    ) -> Result<Self> {
        let config = store.get(guild_id).await.ok_or(Error::ConfigurationMissing)?;
        let (channel_id, _) = config.targets().ok_or(Error::ConfigurationMissing)?;

        let publisher = Arc::new(StatsPublisher::new(
            guild_id,
            channel_id,
            config.stats_message_id,
            gateway.clone(),
            store.clone(),
            timings.stats_interval,
        ));

        match publisher
            .recover(render::stats_title(&config.stats_embed))
            .await
        {
            Ok(_) => {}
            Err(why @ (Error::NotFound | Error::GuildUnavailable)) => return Err(why),
            Err(why) => warn!("Failed to look up stats message of guild {guild_id}: {why}"),
        }

        match roles::ensure_panel(&*gateway, &store, guild_id, channel_id, config.role_message_id)
            .await
        {
            Ok(_) => {}
            Err(why @ (Error::NotFound | Error::GuildUnavailable)) => return Err(why),
            Err(why) => warn!("Failed to post role panel in guild {guild_id}: {why}"),
        }

        lock_counter(&counter).refresh(Utc::now());

        let emitter = Arc::new(PingEmitter::new(
            guild_id,
            gateway,
            store.clone(),
            counter.clone(),
        ));

        let tasks = vec![
            spawn_emitter(guild_id, emitter, timings.ping_interval),
            spawn_tracker(
                counter.clone(),
                timings.recompute_interval,
                timings.prune_interval,
            ),
            spawn_publisher(
                guild_id,
                publisher.clone(),
                store,
                counter.clone(),
                timings.stats_interval,
            ),
        ];

        info!("Started session for guild {guild_id} (stats in channel {channel_id})");

        Ok(Self {
            guild_id,
            counter,
            publisher,
            started_at: Utc::now(),
            tasks,
        })
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn stats_message(&self) -> Option<MessageId> {
        self.publisher.handle()
    }

    pub fn snapshot(&self) -> RateSnapshot {
        lock_counter(&self.counter).snapshot(Utc::now())
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for GuildSession {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        info!("Stopped session for guild {}", self.guild_id);
    }
}

fn ticker(period: Duration) -> time::Interval {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

fn spawn_emitter(guild_id: GuildId, emitter: Arc<PingEmitter>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = ticker(period);

        loop {
            interval.tick().await;

            match emitter.tick().await {
                Ok(EmitOutcome::Sent(channel)) => {
                    debug!("Pinged channel {channel} in guild {guild_id}")
                }
                Ok(EmitOutcome::NoDestination) => {
                    debug!("No eligible channel to ping in guild {guild_id}")
                }
                Ok(EmitOutcome::Failed { channel, error }) => {
                    warn!("Failed to ping channel {channel} in guild {guild_id}: {error}")
                }
                Err(why) => warn!("Ping tick failed in guild {guild_id}: {why}"),
            }
        }
    })
}

/// One recompute pass covers all three windows; pruning runs on its own cadence.
fn spawn_tracker(
    counter: SharedCounter,
    recompute_every: Duration,
    prune_every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut recompute = ticker(recompute_every);
        let mut prune = time::interval_at(Instant::now() + prune_every, prune_every);
        prune.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = recompute.tick() => {
                    lock_counter(&counter).refresh(Utc::now());
                }
                _ = prune.tick() => {
                    let now = Utc::now();
                    let mut guard = lock_counter(&counter);
                    let removed = guard.prune(now);
                    guard.refresh(now);
                    debug!("Pruned {removed} expired ping(s)");
                }
            }
        }
    })
}

fn spawn_publisher(
    guild_id: GuildId,
    publisher: Arc<StatsPublisher>,
    store: Arc<ConfigStore>,
    counter: SharedCounter,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = ticker(period);

        loop {
            interval.tick().await;

            let style = store
                .get(guild_id)
                .await
                .map(|config| config.stats_embed)
                .unwrap_or_default();
            let snapshot = lock_counter(&counter).latest();

            match publisher.upsert(&snapshot, &style).await {
                Ok(UpsertOutcome::Edited(_)) | Ok(UpsertOutcome::Skipped) => {}
                Ok(UpsertOutcome::Created(message)) => {
                    info!("Posted stats message {message} in guild {guild_id}")
                }
                Ok(UpsertOutcome::Recreated { stale, created }) => {
                    info!("Replaced stats message {stale} with {created} in guild {guild_id}")
                }
                Err(why) => error!("Failed to update stats of guild {guild_id}: {why}"),
            }
        }
    })
}
