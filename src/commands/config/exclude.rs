use anyhow::Result;
use pingbot_utils::discord::Colors;
use poise::CreateReply;
use serenity::all::{CreateEmbed, GuildChannel, Mentionable};

use crate::{bot::Context, commands::guild_id};

/// Toggle whether a channel can receive pings
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn exclude_channels(
    ctx: Context<'_>,

    #[description = "The channel to exclude, or include again"]
    #[channel_types("Text")]
    channel: GuildChannel,
) -> Result<()> {
    let guild_id = guild_id(ctx)?;

    let (excluded, total) = ctx
        .data()
        .store()
        .update(guild_id, |config| {
            let excluded = config.toggle_excluded(channel.id);
            (excluded, config.excluded_channels.len())
        })
        .await?;

    let description = if excluded {
        format!("{} will no longer receive pings.", channel.mention())
    } else {
        format!("{} can receive pings again.", channel.mention())
    };

    ctx.send(
        CreateReply::default()
            .embed(
                CreateEmbed::new()
                    .title(if excluded {
                        "Channel excluded"
                    } else {
                        "Channel included"
                    })
                    .description(description)
                    .field("Excluded channels", total.to_string(), true)
                    .color(Colors::Success),
            )
            .ephemeral(true),
    )
    .await?;

    Ok(())
}
