mod bot;
mod commands;

use std::sync::{Arc, OnceLock};

use log::{error, info};
use pingbot_storage::{ConfigStore, Storage};
use poise::Framework;
use serenity::all::ClientBuilder;

#[tokio::main]
async fn main() {
    // Setup logging
    if std::env::var("RUST_LOG").is_err() {
        #[cfg(debug_assertions)]
        std::env::set_var("RUST_LOG", "pingbot");

        #[cfg(not(debug_assertions))]
        std::env::set_var("RUST_LOG", "pingbot=info");
    }

    env_logger::init();

    dotenvy::dotenv().ok();

    // Set up storage
    let storage = Storage::new(pingbot_config::data_dir());
    if let Err(why) = storage.init().await {
        error!("Failed to initialize storage: {why}");
        return;
    }
    let store = Arc::new(ConfigStore::open(storage).await);

    // The session manager only exists once the bot is ready, shutdown needs a handle to it
    let sessions = Arc::new(OnceLock::new());

    // Set up bot
    let framework = Framework::builder()
        .setup({
            let store = store.clone();
            let sessions = sessions.clone();
            move |ctx, ready, framework| Box::pin(bot::setup(ctx, ready, framework, store, sessions))
        })
        .options(bot::framework_opts())
        .build();

    let mut client = match ClientBuilder::new(
        pingbot_config::discord_token(),
        pingbot_config::discord_intents(),
    )
    .framework(framework)
    .await
    {
        Ok(client) => client,
        Err(why) => {
            error!("Fatal error when building Serenity client: {why}");
            return;
        }
    };

    let shard_manager = client.shard_manager.clone();

    tokio::select! {
        result = client.start_autosharded() => {
            if let Err(why) = result {
                error!("Fatal error occured during bot operations: {why}");
                error!("Bot will now shut down!");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");

            match sessions.get() {
                Some(manager) => bot::shutdown(manager).await,
                None => {
                    if let Err(why) = store.flush().await {
                        error!("Failed to flush store: {why:#}");
                    }
                }
            }

            shard_manager.shutdown_all().await;
        }
    }
}
