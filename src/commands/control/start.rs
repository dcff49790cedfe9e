use anyhow::Result;
use log::error;
use pingbot_session::Error;
use pingbot_utils::discord::Colors;
use poise::CreateReply;
use serenity::all::{CreateEmbed, CreateEmbedFooter};

use crate::{
    bot::{Context, FrameworkError},
    commands::guild_id,
};

/// Start pinging in this server
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    on_error = on_error
)]
pub async fn start(ctx: Context<'_>) -> Result<()> {
    let guild_id = guild_id(ctx)?;
    let manager = ctx.data();

    ctx.defer_ephemeral().await?;

    let restarted = manager.is_running(guild_id).await;

    let embed = match manager.start(guild_id).await {
        Ok(()) => CreateEmbed::new()
            .title(if restarted { "Pings restarted" } else { "Pings started" })
            .description("The bot will now ping the configured role periodically.")
            .color(Colors::Success),
        Err(Error::ConfigurationMissing) => CreateEmbed::new()
            .title("Not configured")
            .description("This server has no statistics channel or ping role yet.")
            .footer(CreateEmbedFooter::new("Use /setup to configure them."))
            .color(Colors::Error),
        Err(why) => return Err(why.into()),
    };

    ctx.send(CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

async fn on_error(error: FrameworkError<'_>) {
    if let FrameworkError::Command { error, ctx, .. } = error {
        error!("An error occured while starting pings: {error:#}");

        _ = ctx
            .send(
                CreateReply::default()
                    .embed(
                        CreateEmbed::new()
                            .description(
                                "An error occured whilst starting. Check that the bot can see the statistics channel.",
                            )
                            .color(Colors::Error),
                    )
                    .ephemeral(true),
            )
            .await;
    } else {
        error!("{error}")
    }
}
