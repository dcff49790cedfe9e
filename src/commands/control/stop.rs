use anyhow::Result;
use pingbot_utils::discord::Colors;
use poise::CreateReply;
use serenity::all::{CreateEmbed, CreateEmbedFooter};

use crate::{bot::Context, commands::guild_id};

/// Stop pinging in this server
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn stop(ctx: Context<'_>) -> Result<()> {
    let guild_id = guild_id(ctx)?;

    let embed = if ctx.data().stop(guild_id).await {
        CreateEmbed::new()
            .title("Pings stopped")
            .description("No more pings will be sent until /start is used.")
            .color(Colors::Success)
    } else {
        CreateEmbed::new()
            .title("Not running")
            .description("Pings are not running in this server.")
            .footer(CreateEmbedFooter::new("Use /start to begin pinging."))
            .color(Colors::Info)
    };

    ctx.send(CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}
