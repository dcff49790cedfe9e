use anyhow::Result;
use log::info;
use pingbot_session::Error;
use pingbot_utils::discord::Colors;
use poise::CreateReply;
use serenity::all::{CreateEmbed, CreateEmbedFooter, GuildChannel, Mentionable, Role};

use crate::{bot::Context, commands::guild_id};

/// Choose the statistics channel and the role to ping, then start pinging
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn setup(
    ctx: Context<'_>,

    #[description = "Channel that holds the statistics and the role panel"]
    #[channel_types("Text")]
    channel: GuildChannel,

    #[description = "Role that gets mentioned"] role: Role,
) -> Result<()> {
    let guild_id = guild_id(ctx)?;
    let manager = ctx.data();

    manager
        .store()
        .update(guild_id, |config| config.set_targets(channel.id, role.id))
        .await?;

    info!(
        "Guild {guild_id} set up with stats channel {} and role {}",
        channel.id, role.id
    );

    // Starting posts the stats message and role panel, which can take a moment
    ctx.defer_ephemeral().await?;

    let embed = match manager.start(guild_id).await {
        Ok(()) => CreateEmbed::new()
            .title("Setup complete")
            .description(format!(
                "{} will be pinged across the server.\nStatistics are posted in {}.",
                role.mention(),
                channel.mention()
            ))
            .footer(CreateEmbedFooter::new(
                "Use /exclude_channels to keep pings out of specific channels.",
            ))
            .color(Colors::Success),
        Err(Error::ConfigurationMissing) => CreateEmbed::new()
            .title("Setup incomplete")
            .description("The configuration could not be read back. Please try again.")
            .color(Colors::Error),
        Err(why) => return Err(why.into()),
    };

    ctx.send(CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}
