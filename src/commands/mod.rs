pub mod config;
pub mod control;

use anyhow::{Context as _, Result};
use serenity::all::GuildId;

use crate::bot::Context;

/// Every command is registered `guild_only`, this only fails if Discord misbehaves.
fn guild_id(ctx: Context<'_>) -> Result<GuildId> {
    ctx.guild_id()
        .context("Command was invoked outside of a server")
}
