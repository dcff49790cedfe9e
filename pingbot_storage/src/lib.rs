mod guild;

pub use guild::{EmbedStyle, GuildConfig, GuildConfigs};

use anyhow::{Context, Result};
use log::{error, info};
use serenity::all::GuildId;
use std::path::PathBuf;
use tokio::{fs, sync::RwLock};

pub const STORE_FILE: &str = "guilds.json";

/// The on-disk record of every guild's configuration and message handles.
#[derive(Clone)]
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)
            .await
            .context("Failed to create data directory")?;
        Ok(())
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }

    /// Reads the store. A missing file is a first run and is written out
    /// immediately; any other failure is logged and yields an empty record so
    /// the bot can still come up.
    pub async fn load(&self) -> GuildConfigs {
        let path = self.path();

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(why) if why.kind() == std::io::ErrorKind::NotFound => {
                let configs = GuildConfigs::default();
                match self.save(&configs).await {
                    Ok(()) => info!("Created new store at {}", path.display()),
                    Err(why) => error!("Failed to create store: {why:#}"),
                }
                return configs;
            }
            Err(why) => {
                error!("Failed to read store {}: {why}", path.display());
                return GuildConfigs::default();
            }
        };

        match serde_json::from_str::<GuildConfigs>(&content) {
            Ok(configs) => {
                info!("Loaded configuration for {} guild(s)", configs.len());
                configs
            }
            Err(why) => {
                error!("Failed to parse store {}: {why}", path.display());
                GuildConfigs::default()
            }
        }
    }

    /// Replaces the store file. The record is written to a sibling temp file and
    /// renamed over the original so readers never see a partial write.
    pub async fn save(&self, configs: &GuildConfigs) -> Result<()> {
        self.init().await?;

        let path = self.path();
        let tmp_path = path.with_extension("json.tmp");
        let content =
            serde_json::to_string_pretty(configs).context("Failed to serialize store")?;

        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path)
            .await
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        Ok(())
    }
}

/// In-memory authoritative copy of the store. Every mutation is written back
/// before the write lock is released, so saves land in mutation order.
pub struct ConfigStore {
    storage: Storage,
    configs: RwLock<GuildConfigs>,
}

impl ConfigStore {
    pub async fn open(storage: Storage) -> Self {
        let configs = storage.load().await;

        Self {
            storage,
            configs: RwLock::new(configs),
        }
    }

    pub async fn get(&self, guild_id: GuildId) -> Option<GuildConfig> {
        self.configs.read().await.get(&guild_id).cloned()
    }

    pub async fn guilds(&self) -> Vec<GuildId> {
        self.configs.read().await.keys().copied().collect()
    }

    /// Creates a default entry for a guild seen for the first time.
    /// Returns `true` if an entry was created.
    pub async fn ensure(&self, guild_id: GuildId) -> Result<bool> {
        let mut configs = self.configs.write().await;
        if configs.contains_key(&guild_id) {
            return Ok(false);
        }

        configs.insert(guild_id, GuildConfig::default());
        self.storage.save(&configs).await?;

        Ok(true)
    }

    /// Applies `f` to the guild's entry (creating it if needed) and persists.
    ///
    /// If the save fails the in-memory change is kept and the error returned.
    pub async fn update<F, R>(&self, guild_id: GuildId, f: F) -> Result<R>
    where
        F: FnOnce(&mut GuildConfig) -> R,
    {
        let mut configs = self.configs.write().await;
        let result = f(configs.entry(guild_id).or_default());

        self.storage
            .save(&configs)
            .await
            .with_context(|| format!("Failed to persist configuration of guild {guild_id}"))?;

        Ok(result)
    }

    pub async fn flush(&self) -> Result<()> {
        let configs = self.configs.read().await;
        self.storage.save(&configs).await
    }
}
