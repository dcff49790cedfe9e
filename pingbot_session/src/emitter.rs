use std::sync::Arc;

use chrono::Utc;
use pingbot_storage::ConfigStore;
use rand::seq::SliceRandom;
use serenity::all::{ChannelId, GuildId};

use crate::{
    error::{Error, Result},
    gateway::Gateway,
    lock_counter, render, SharedCounter,
};

#[derive(Debug)]
pub enum EmitOutcome {
    Sent(ChannelId),
    /// Nothing passed the type, exclusion and permission filters.
    NoDestination,
    /// The chosen channel rejected the ping. Nothing was recorded.
    Failed { channel: ChannelId, error: Error },
}

/// Sends one role mention to a random eligible channel per tick.
pub struct PingEmitter {
    guild_id: GuildId,
    gateway: Arc<dyn Gateway>,
    store: Arc<ConfigStore>,
    counter: SharedCounter,
}

impl PingEmitter {
    pub fn new(
        guild_id: GuildId,
        gateway: Arc<dyn Gateway>,
        store: Arc<ConfigStore>,
        counter: SharedCounter,
    ) -> Self {
        Self {
            guild_id,
            gateway,
            store,
            counter,
        }
    }

    /// Configuration is read on every tick so exclusions and embed changes
    /// apply without restarting the session.
    pub async fn tick(&self) -> Result<EmitOutcome> {
        let config = self
            .store
            .get(self.guild_id)
            .await
            .ok_or(Error::ConfigurationMissing)?;
        let (stats_channel, role_id) = config.targets().ok_or(Error::ConfigurationMissing)?;

        let destinations = self
            .gateway
            .eligible_destinations(self.guild_id, &config.excluded_channels, stats_channel)
            .await?;

        let Some(channel) = pick(&destinations) else {
            return Ok(EmitOutcome::NoDestination);
        };

        let payload = render::ping_message(role_id, &config.pinged_embed);
        match self.gateway.send(channel, &payload).await {
            Ok(_) => {
                lock_counter(&self.counter).record(Utc::now());
                Ok(EmitOutcome::Sent(channel))
            }
            Err(error) => Ok(EmitOutcome::Failed { channel, error }),
        }
    }
}

fn pick(destinations: &[ChannelId]) -> Option<ChannelId> {
    destinations.choose(&mut rand::thread_rng()).copied()
}
