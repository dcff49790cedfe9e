use std::sync::LazyLock;

use log::warn;

pub static DISCORD_TOKEN: LazyLock<String> = LazyLock::new(|| {
    std::env::var("DISCORD_TOKEN").expect("missing DISCORD_TOKEN environment variable")
});
pub static DATA_DIR: LazyLock<String> = LazyLock::new(|| {
    std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string())
});
pub static PING_INTERVAL_MS: LazyLock<u64> =
    LazyLock::new(|| parse_or("PING_INTERVAL_MS", std::env::var("PING_INTERVAL_MS").ok(), 120_000));
pub static STATS_INTERVAL_SECS: LazyLock<u64> =
    LazyLock::new(|| parse_or("STATS_INTERVAL_SECS", std::env::var("STATS_INTERVAL_SECS").ok(), 60));
pub static RECOMPUTE_INTERVAL_MS: LazyLock<u64> = LazyLock::new(|| {
    parse_or("RECOMPUTE_INTERVAL_MS", std::env::var("RECOMPUTE_INTERVAL_MS").ok(), 1_000)
});
pub static PRUNE_INTERVAL_SECS: LazyLock<u64> =
    LazyLock::new(|| parse_or("PRUNE_INTERVAL_SECS", std::env::var("PRUNE_INTERVAL_SECS").ok(), 3_600));

pub static TARGET_GUILD_ID: LazyLock<Option<u64>> =
    LazyLock::new(|| std::env::var("TARGET_GUILD_ID").ok().and_then(|v| parse_id(&v)));
pub static TARGET_CHANNEL_ID: LazyLock<Option<u64>> =
    LazyLock::new(|| std::env::var("TARGET_CHANNEL_ID").ok().and_then(|v| parse_id(&v)));
pub static PING_ROLE_ID: LazyLock<Option<u64>> =
    LazyLock::new(|| std::env::var("PING_ROLE_ID").ok().and_then(|v| parse_id(&v)));
pub static EXCLUDED_CHANNELS: LazyLock<Vec<u64>> = LazyLock::new(|| {
    std::env::var("EXCLUDED_CHANNELS")
        .map(|v| parse_id_list(&v))
        .unwrap_or_default()
});

/// Parses a positive integer, falling back to `default` when absent or malformed.
pub(crate) fn parse_or(name: &str, value: Option<String>, default: u64) -> u64 {
    let Some(value) = value else {
        return default;
    };

    match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => {
            warn!("Ignoring invalid {name}={value:?}, using {default}");
            default
        }
        Ok(parsed) => parsed,
    }
}

/// Discord snowflakes are never zero.
pub(crate) fn parse_id(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|id| *id != 0)
}

pub(crate) fn parse_id_list(value: &str) -> Vec<u64> {
    value
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .filter_map(|part| {
            let id = parse_id(part);
            if id.is_none() {
                warn!("Ignoring invalid channel id {part:?} in EXCLUDED_CHANNELS");
            }
            id
        })
        .collect()
}
