use std::sync::{Arc, OnceLock};

use anyhow::Result;
use log::{error, info};
use pingbot_session::{
    discord::SerenityGateway,
    roles::{self, RoleAction},
    SessionManager, Timings,
};
use pingbot_storage::ConfigStore;
use pingbot_utils::discord::Colors;
use poise::{CreateReply, Framework, FrameworkContext, FrameworkOptions};
use serenity::all::{
    ComponentInteraction, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseMessage, FullEvent, Interaction, Ready,
};

use crate::commands;

pub type Data = SessionManager;
pub type Error = anyhow::Error;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type FrameworkError<'a> = poise::FrameworkError<'a, Data, Error>;

const MISSING_ROLE_REPLY: &str = "❌ The ping role does not exist!";

pub fn framework_opts() -> FrameworkOptions<Data, Error> {
    FrameworkOptions {
        commands: vec![
            commands::config::setup(),
            commands::config::exclude_channels(),
            commands::config::set_pinged_embed(),
            commands::config::set_stats_embed(),
            commands::control::status(),
            commands::control::start(),
            commands::control::stop(),
        ],
        on_error: |error| Box::pin(on_error(error)),
        event_handler: |ctx, event, framework, data| {
            Box::pin(event_handler(ctx, event, framework, data))
        },
        ..Default::default()
    }
}

pub fn timings() -> Timings {
    Timings {
        ping_interval: pingbot_config::ping_interval(),
        stats_interval: pingbot_config::stats_interval(),
        recompute_interval: pingbot_config::recompute_interval(),
        prune_interval: pingbot_config::prune_interval(),
    }
}

pub async fn setup(
    ctx: &serenity::all::Context,
    ready: &Ready,
    framework: &Framework<Data, Error>,
    store: Arc<ConfigStore>,
    sessions: Arc<OnceLock<SessionManager>>,
) -> Result<Data> {
    info!("Successfully logged in as {}", ready.user.name);

    poise::builtins::register_globally(ctx, &framework.options().commands).await?;

    seed_bootstrap_guild(&store).await;

    let gateway = Arc::new(SerenityGateway::new(ctx.http.clone(), ctx.cache.clone()));
    let manager = SessionManager::new(store, gateway, timings());

    for guild in &ready.guilds {
        if let Err(why) = manager.observe_guild(guild.id).await {
            error!("Failed to register guild {}: {why}", guild.id);
        }
    }

    let started = manager.start_configured().await;
    info!("Started {started} guild session(s)");

    _ = sessions.set(manager.clone());

    Ok(manager)
}

pub async fn shutdown(manager: &SessionManager) {
    info!("Stopping {} session(s)", manager.active_count().await);
    manager.shutdown_all().await;
}

/// Fills in the environment-provided guild unless it was already set up with `/setup`.
async fn seed_bootstrap_guild(store: &ConfigStore) {
    let Some(bootstrap) = pingbot_config::bootstrap_guild() else {
        return;
    };

    let result = store
        .update(bootstrap.guild_id, |config| {
            if config.targets().is_some() {
                return false;
            }

            config.set_targets(bootstrap.channel_id, bootstrap.role_id);
            config
                .excluded_channels
                .extend(bootstrap.excluded_channels.iter().copied());
            true
        })
        .await;

    match result {
        Ok(true) => info!("Configured guild {} from environment", bootstrap.guild_id),
        Ok(false) => {}
        Err(why) => error!("{why:#}"),
    }
}

async fn event_handler(
    ctx: &serenity::all::Context,
    event: &FullEvent,
    _framework: FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<()> {
    match event {
        FullEvent::GuildCreate { guild, .. } => {
            if let Err(why) = data.observe_guild(guild.id).await {
                error!("Failed to register guild {}: {why}", guild.id);
            }
        }
        FullEvent::InteractionCreate {
            interaction: Interaction::Component(component),
        } => handle_role_button(ctx, component, data).await?,
        _ => {}
    }

    Ok(())
}

async fn handle_role_button(
    ctx: &serenity::all::Context,
    component: &ComponentInteraction,
    data: &Data,
) -> Result<()> {
    let Some(action) = RoleAction::from_custom_id(&component.data.custom_id) else {
        return Ok(());
    };
    let (Some(guild_id), Some(member)) = (component.guild_id, component.member.as_ref()) else {
        return Ok(());
    };

    let role_id = data
        .store()
        .get(guild_id)
        .await
        .and_then(|config| config.ping_role_id);

    let reply = match role_id {
        None => MISSING_ROLE_REPLY,
        Some(role_id) => {
            match roles::apply(
                data.gateway(),
                guild_id,
                member.user.id,
                &member.roles,
                role_id,
                action,
            )
            .await
            {
                Ok(outcome) => outcome.reply(),
                Err(pingbot_session::Error::NotFound) => MISSING_ROLE_REPLY,
                Err(why) => {
                    error!(
                        "Failed to update ping role of {} in guild {guild_id}: {why}",
                        member.user.name
                    );
                    "❌ An error occurred while updating your roles!"
                }
            }
        }
    };

    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(reply)
                    .ephemeral(true),
            ),
        )
        .await?;

    Ok(())
}

async fn on_error(error: FrameworkError<'_>) {
    match error {
        FrameworkError::Command { error, ctx, .. } => {
            error!("An error occured during /{}: {error:#}", ctx.command().name);

            _ = ctx
                .send(
                    CreateReply::default()
                        .embed(
                            CreateEmbed::new()
                                .description("An error occured whilst running this command.")
                                .color(Colors::Error),
                        )
                        .ephemeral(true),
                )
                .await;
        }
        error => {
            if let Err(why) = poise::builtins::on_error(error).await {
                error!("Failed to handle framework error: {why}");
            }
        }
    }
}
