mod env;

use std::time::Duration;

use serenity::all::{ChannelId, GatewayIntents, GuildId, RoleId};

pub fn discord_token() -> &'static str {
    &env::DISCORD_TOKEN
}

pub fn discord_intents() -> GatewayIntents {
    GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::GUILD_MEMBERS
}

pub fn data_dir() -> &'static str {
    &env::DATA_DIR
}

pub fn ping_interval() -> Duration {
    Duration::from_millis(*env::PING_INTERVAL_MS)
}

pub fn stats_interval() -> Duration {
    Duration::from_secs(*env::STATS_INTERVAL_SECS)
}

pub fn recompute_interval() -> Duration {
    Duration::from_millis(*env::RECOMPUTE_INTERVAL_MS)
}

pub fn prune_interval() -> Duration {
    Duration::from_secs(*env::PRUNE_INTERVAL_SECS)
}

/// A guild configured entirely from the environment, for single-server deployments.
#[derive(Debug, Clone)]
pub struct BootstrapGuild {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub role_id: RoleId,
    pub excluded_channels: Vec<ChannelId>,
}

pub fn bootstrap_guild() -> Option<BootstrapGuild> {
    Some(BootstrapGuild {
        guild_id: GuildId::new((*env::TARGET_GUILD_ID)?),
        channel_id: ChannelId::new((*env::TARGET_CHANNEL_ID)?),
        role_id: RoleId::new((*env::PING_ROLE_ID)?),
        excluded_channels: env::EXCLUDED_CHANNELS
            .iter()
            .copied()
            .map(ChannelId::new)
            .collect(),
    })
}
