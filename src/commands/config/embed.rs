use anyhow::Result;
use pingbot_storage::{EmbedStyle, GuildConfig};
use pingbot_utils::discord::{format_color, parse_color, Colors, DEFAULT_EMBED_COLOR};
use poise::CreateReply;
use serenity::all::{CreateEmbed, CreateEmbedFooter};

use crate::{bot::Context, commands::guild_id};

/// Customize the embed attached to every ping
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn set_pinged_embed(
    ctx: Context<'_>,

    #[description = "Embed title"]
    #[max_length = 256]
    title: Option<String>,

    #[description = "Embed description"]
    #[max_length = 4096]
    description: Option<String>,

    #[description = "Embed colour, for example #0099FF"] color: Option<String>,
) -> Result<()> {
    update_style(ctx, title, description, color, pinged_style).await
}

/// Customize the statistics embed
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn set_stats_embed(
    ctx: Context<'_>,

    #[description = "Embed title"]
    #[max_length = 256]
    title: Option<String>,

    #[description = "Embed description"]
    #[max_length = 4096]
    description: Option<String>,

    #[description = "Embed colour, for example #0099FF"] color: Option<String>,
) -> Result<()> {
    update_style(ctx, title, description, color, stats_style).await
}

async fn update_style(
    ctx: Context<'_>,
    title: Option<String>,
    description: Option<String>,
    color: Option<String>,
    select: fn(&mut GuildConfig) -> &mut EmbedStyle,
) -> Result<()> {
    let guild_id = guild_id(ctx)?;

    let color = match color.as_deref().map(parse_color) {
        None => None,
        Some(Some(color)) => Some(color),
        Some(None) => {
            ctx.send(
                CreateReply::default()
                    .embed(
                        CreateEmbed::new()
                            .title("Invalid colour")
                            .description("Use a hex colour such as `#0099FF`.")
                            .color(Colors::Error),
                    )
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }
    };

    if title.is_none() && description.is_none() && color.is_none() {
        ctx.send(
            CreateReply::default()
                .embed(
                    CreateEmbed::new()
                        .title("Nothing to change")
                        .description("Provide a title, a description or a colour.")
                        .color(Colors::Warning),
                )
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let style = ctx
        .data()
        .store()
        .update(guild_id, |config| {
            let style = select(config);
            style.merge(title, description, color);
            style.clone()
        })
        .await?;

    let mut preview = CreateEmbed::new()
        .title(style.title.clone().unwrap_or_else(|| "Embed updated".to_string()))
        .color(style.color.unwrap_or(DEFAULT_EMBED_COLOR))
        .footer(CreateEmbedFooter::new(format!(
            "Colour {}. Changes apply from the next update.",
            format_color(style.color.unwrap_or(DEFAULT_EMBED_COLOR))
        )));

    if let Some(description) = &style.description {
        preview = preview.description(description);
    }

    ctx.send(CreateReply::default().embed(preview).ephemeral(true))
        .await?;

    Ok(())
}

fn pinged_style(config: &mut GuildConfig) -> &mut EmbedStyle {
    &mut config.pinged_embed
}

fn stats_style(config: &mut GuildConfig) -> &mut EmbedStyle {
    &mut config.stats_embed
}
