use std::collections::BTreeSet;

use async_trait::async_trait;
use serenity::all::{ChannelId, GuildId, MessageId, RoleId, UserId};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedPayload {
    pub title: String,
    pub description: Option<String>,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
    pub timestamp: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    Primary,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub custom_id: String,
    pub label: String,
    pub style: ButtonStyle,
}

/// Everything needed to send or edit one message, independent of the client library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagePayload {
    pub content: Option<String>,
    pub embed: Option<EmbedPayload>,
    pub buttons: Vec<Button>,
}

/// The chat platform as seen by the periodic tasks.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Text channels of `guild` the bot may write to, minus the stats channel
    /// and the excluded set.
    async fn eligible_destinations(
        &self,
        guild_id: GuildId,
        excluded: &BTreeSet<ChannelId>,
        stats_channel: ChannelId,
    ) -> Result<Vec<ChannelId>>;

    async fn send(&self, channel_id: ChannelId, payload: &MessagePayload) -> Result<MessageId>;

    /// Fails with [`crate::Error::NotFound`] if the message is gone.
    async fn fetch_message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<()>;

    /// Fails with [`crate::Error::NotFound`] if the message is gone.
    async fn edit(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        payload: &MessagePayload,
    ) -> Result<()>;

    /// Looks through recent messages for one of ours whose first embed has `title`.
    async fn find_own_embed(&self, channel_id: ChannelId, title: &str) -> Result<Option<MessageId>>;

    async fn grant_role(&self, guild_id: GuildId, user_id: UserId, role_id: RoleId) -> Result<()>;

    async fn revoke_role(&self, guild_id: GuildId, user_id: UserId, role_id: RoleId)
        -> Result<()>;
}
