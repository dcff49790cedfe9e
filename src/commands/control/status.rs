use anyhow::Result;
use chrono::{DateTime, Utc};
use pingbot_session::render::describe_interval;
use pingbot_stats::RateSnapshot;
use pingbot_storage::GuildConfig;
use pingbot_utils::discord::Colors;
use poise::CreateReply;
use serenity::all::{CreateEmbed, Mentionable};

use crate::{bot::Context, commands::guild_id};

/// Show this server's ping configuration and statistics
#[poise::command(slash_command, guild_only)]
pub async fn status(ctx: Context<'_>) -> Result<()> {
    let guild_id = guild_id(ctx)?;
    let manager = ctx.data();

    let config = manager.store().get(guild_id).await.unwrap_or_default();
    let started_at = manager.started_at(guild_id).await;
    let running = started_at.is_some();
    let snapshot = manager.snapshot(guild_id);
    let timings = manager.timings();

    let embed = CreateEmbed::new()
        .title("📋 Ping Status")
        .field("State", state(started_at), true)
        .field(
            "Statistics channel",
            config
                .target_channel_id
                .map(|channel| channel.mention().to_string())
                .unwrap_or_else(|| "Not set".to_string()),
            true,
        )
        .field(
            "Ping role",
            config
                .ping_role_id
                .map(|role| role.mention().to_string())
                .unwrap_or_else(|| "Not set".to_string()),
            true,
        )
        .field("Excluded channels", excluded_list(&config), false)
        .field("Pings", rates(&snapshot), false)
        .field(
            "Cadence",
            format!(
                "Pings {}, statistics {}",
                describe_interval(timings.ping_interval),
                describe_interval(timings.stats_interval)
            ),
            false,
        )
        .color(if running { Colors::Success } else { Colors::Info });

    ctx.send(CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

fn state(started_at: Option<DateTime<Utc>>) -> String {
    match started_at {
        Some(started_at) => format!("🟢 Running since <t:{}:R>", started_at.timestamp()),
        None => "🔴 Stopped".to_string(),
    }
}

fn excluded_list(config: &GuildConfig) -> String {
    if config.excluded_channels.is_empty() {
        return "None".to_string();
    }

    config
        .excluded_channels
        .iter()
        .map(|channel| channel.mention().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn rates(snapshot: &RateSnapshot) -> String {
    format!(
        "{}/s · {}/min · {}/h · {} in the last hour",
        snapshot.per_second, snapshot.per_minute, snapshot.per_hour, snapshot.retained
    )
}
