use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use pingbot_stats::{PingCounter, RateSnapshot};
use pingbot_storage::ConfigStore;
use serenity::all::GuildId;

use crate::{
    error::{Error, Result},
    gateway::Gateway,
    lock_counter,
    session::{GuildSession, Timings},
    SharedCounter,
};

/// Registry of per-guild sessions. Cheap to clone; every clone shares state.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<InnerManager>,
}

struct InnerManager {
    store: Arc<ConfigStore>,
    gateway: Arc<dyn Gateway>,
    timings: Timings,
    sessions: tokio::sync::Mutex<HashMap<GuildId, GuildSession>>,

    /// Counters outlive sessions so a restart does not reset the statistics.
    counters: Mutex<HashMap<GuildId, SharedCounter>>,
}

impl SessionManager {
    pub fn new(store: Arc<ConfigStore>, gateway: Arc<dyn Gateway>, timings: Timings) -> Self {
        Self {
            inner: Arc::new(InnerManager {
                store,
                gateway,
                timings,
                sessions: tokio::sync::Mutex::new(HashMap::new()),
                counters: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.inner.store
    }

    pub fn gateway(&self) -> &dyn Gateway {
        &*self.inner.gateway
    }

    pub fn timings(&self) -> Timings {
        self.inner.timings
    }

    fn counter(&self, guild_id: GuildId) -> SharedCounter {
        self.inner
            .counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(guild_id)
            .or_insert_with(|| Arc::new(Mutex::new(PingCounter::new())))
            .clone()
    }

    /// Gives a newly seen guild a default configuration.
    pub async fn observe_guild(&self, guild_id: GuildId) -> Result<()> {
        if self.inner.store.ensure(guild_id).await? {
            info!("Registered new guild {guild_id}");
        }

        Ok(())
    }

    /// Starts (or restarts) the guild's session. The registry is not locked
    /// while the new session talks to the gateway.
    pub async fn start(&self, guild_id: GuildId) -> Result<()> {
        let previous = self.inner.sessions.lock().await.remove(&guild_id);
        if let Some(previous) = previous {
            previous.stop();
        }

        let session = GuildSession::start(
            guild_id,
            self.inner.gateway.clone(),
            self.inner.store.clone(),
            self.counter(guild_id),
            self.inner.timings,
        )
        .await?;

        let mut sessions = self.inner.sessions.lock().await;
        if let Some(raced) = sessions.insert(guild_id, session) {
            warn!("Guild {guild_id} was started twice at once, keeping the newest session");
            raced.stop();
        }
        info!("Active sessions: {}", sessions.len());

        Ok(())
    }

    /// Returns `false` if the guild had no running session.
    pub async fn stop(&self, guild_id: GuildId) -> bool {
        let session = self.inner.sessions.lock().await.remove(&guild_id);

        match session {
            Some(session) => {
                session.stop();
                true
            }
            None => false,
        }
    }

    pub async fn is_running(&self, guild_id: GuildId) -> bool {
        self.inner.sessions.lock().await.contains_key(&guild_id)
    }

    pub async fn started_at(&self, guild_id: GuildId) -> Option<DateTime<Utc>> {
        self.inner
            .sessions
            .lock()
            .await
            .get(&guild_id)
            .map(GuildSession::started_at)
    }

    pub async fn active_count(&self) -> usize {
        self.inner.sessions.lock().await.len()
    }

    /// Current rates for a guild, whether or not its session is running.
    pub fn snapshot(&self, guild_id: GuildId) -> RateSnapshot {
        lock_counter(&self.counter(guild_id)).snapshot(Utc::now())
    }

    /// Starts every guild that has a target channel and role. Guilds that fail
    /// are logged and skipped. Returns how many sessions are running.
    pub async fn start_configured(&self) -> usize {
        let mut started = 0;

        for guild_id in self.inner.store.guilds().await {
            match self.start(guild_id).await {
                Ok(()) => started += 1,
                Err(Error::ConfigurationMissing) => {
                    info!("Guild {guild_id} is not configured yet, not starting")
                }
                Err(why) => error!("Failed to start session for guild {guild_id}: {why}"),
            }
        }

        started
    }

    /// Cancels every session and writes the store out one last time.
    pub async fn shutdown_all(&self) {
        let sessions: Vec<_> = self.inner.sessions.lock().await.drain().collect();
        for (_, session) in sessions {
            session.stop();
        }

        if let Err(why) = self.inner.store.flush().await {
            warn!("Failed to flush store during shutdown: {why:#}");
        }
    }
}
