use serde::{Deserialize, Serialize};
use serenity::all::{ChannelId, GuildId, MessageId, RoleId};
use std::collections::{BTreeMap, BTreeSet};

pub type GuildConfigs = BTreeMap<GuildId, GuildConfig>;

/// User-overridable parts of an embed. Unset fields fall back to the bot's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
}

impl EmbedStyle {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }

    /// Overwrites only the fields that were provided.
    pub fn merge(&mut self, title: Option<String>, description: Option<String>, color: Option<u32>) {
        if title.is_some() {
            self.title = title;
        }
        if description.is_some() {
            self.description = description;
        }
        if color.is_some() {
            self.color = color;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuildConfig {
    pub target_channel_id: Option<ChannelId>,
    pub ping_role_id: Option<RoleId>,
    pub excluded_channels: BTreeSet<ChannelId>,
    pub stats_message_id: Option<MessageId>,
    pub role_message_id: Option<MessageId>,
    pub pinged_embed: EmbedStyle,
    pub stats_embed: EmbedStyle,
}

impl GuildConfig {
    /// The target channel and ping role, if both are configured.
    pub fn targets(&self) -> Option<(ChannelId, RoleId)> {
        Some((self.target_channel_id?, self.ping_role_id?))
    }

    /// Points the guild at a new stats channel and role. Handles pointing into a
    /// previous channel are dropped.
    pub fn set_targets(&mut self, channel_id: ChannelId, role_id: RoleId) {
        if self.target_channel_id != Some(channel_id) {
            self.stats_message_id = None;
            self.role_message_id = None;
        }
        self.target_channel_id = Some(channel_id);
        self.ping_role_id = Some(role_id);
    }

    /// Flips a channel's exclusion. Returns `true` if it is now excluded.
    pub fn toggle_excluded(&mut self, channel_id: ChannelId) -> bool {
        if self.excluded_channels.remove(&channel_id) {
            false
        } else {
            self.excluded_channels.insert(channel_id);
            true
        }
    }
}
