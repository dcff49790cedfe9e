use std::{collections::BTreeSet, sync::Arc};

use async_trait::async_trait;
use serenity::all::{
    ButtonStyle as SerenityButtonStyle, Cache, ChannelId, ChannelType, CreateActionRow,
    CreateButton, CreateEmbed, CreateEmbedFooter, CreateMessage, EditMessage, GetMessages,
    GuildId, Http, MessageId, RoleId, Timestamp, UserId,
};

use crate::{
    error::{Error, Result},
    gateway::{ButtonStyle, EmbedPayload, Gateway, MessagePayload},
};

/// How far back to look for a stats message posted before a restart.
const RECOVERY_SCAN_LIMIT: u8 = 10;
const ROLE_AUDIT_REASON: &str = "Ping role self-service";

/// [`Gateway`] backed by the serenity HTTP client and gateway cache.
#[derive(Clone)]
pub struct SerenityGateway {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl SerenityGateway {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }
}

fn build_embed(payload: &EmbedPayload) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&payload.title)
        .colour(payload.color);

    if let Some(description) = &payload.description {
        embed = embed.description(description);
    }
    for field in &payload.fields {
        embed = embed.field(&field.name, &field.value, field.inline);
    }
    if let Some(footer) = &payload.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }
    if payload.timestamp {
        embed = embed.timestamp(Timestamp::now());
    }

    embed
}

fn build_components(payload: &MessagePayload) -> Vec<CreateActionRow> {
    if payload.buttons.is_empty() {
        return Vec::new();
    }

    let buttons = payload
        .buttons
        .iter()
        .map(|button| {
            CreateButton::new(&button.custom_id)
                .label(&button.label)
                .style(match button.style {
                    ButtonStyle::Primary => SerenityButtonStyle::Primary,
                    ButtonStyle::Danger => SerenityButtonStyle::Danger,
                })
        })
        .collect();

    vec![CreateActionRow::Buttons(buttons)]
}

fn build_message(payload: &MessagePayload) -> CreateMessage {
    let mut message = CreateMessage::new().components(build_components(payload));

    if let Some(content) = &payload.content {
        message = message.content(content);
    }
    if let Some(embed) = &payload.embed {
        message = message.embed(build_embed(embed));
    }

    message
}

fn build_edit(payload: &MessagePayload) -> EditMessage {
    let mut message = EditMessage::new().components(build_components(payload));

    if let Some(content) = &payload.content {
        message = message.content(content);
    }
    if let Some(embed) = &payload.embed {
        message = message.embed(build_embed(embed));
    }

    message
}

#[async_trait]
impl Gateway for SerenityGateway {
    async fn eligible_destinations(
        &self,
        guild_id: GuildId,
        excluded: &BTreeSet<ChannelId>,
        stats_channel: ChannelId,
    ) -> Result<Vec<ChannelId>> {
        let bot_id = self.cache.current_user().id;
        let cached = {
            let guild = self.cache.guild(guild_id).ok_or(Error::GuildUnavailable)?;
            guild.members.get(&bot_id).cloned()
        };
        let member = match cached {
            Some(member) => member,
            None => guild_id.member(&self.http, bot_id).await?,
        };

        let guild = self.cache.guild(guild_id).ok_or(Error::GuildUnavailable)?;
        let destinations = guild
            .channels
            .values()
            .filter(|channel| {
                channel.kind == ChannelType::Text
                    && channel.id != stats_channel
                    && !excluded.contains(&channel.id)
                    && guild.user_permissions_in(channel, &member).send_messages()
            })
            .map(|channel| channel.id)
            .collect();

        Ok(destinations)
    }

    async fn send(&self, channel_id: ChannelId, payload: &MessagePayload) -> Result<MessageId> {
        let message = channel_id
            .send_message(&self.http, build_message(payload))
            .await
            .map_err(|why| match Error::from(why) {
                Error::Serenity(why) => Error::Send {
                    channel: channel_id,
                    reason: why.to_string(),
                },
                other => other,
            })?;

        Ok(message.id)
    }

    async fn fetch_message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<()> {
        channel_id.message(&self.http, message_id).await?;
        Ok(())
    }

    async fn edit(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        payload: &MessagePayload,
    ) -> Result<()> {
        channel_id
            .edit_message(&self.http, message_id, build_edit(payload))
            .await?;
        Ok(())
    }

    async fn find_own_embed(&self, channel_id: ChannelId, title: &str) -> Result<Option<MessageId>> {
        let bot_id = self.cache.current_user().id;
        let messages = channel_id
            .messages(&self.http, GetMessages::new().limit(RECOVERY_SCAN_LIMIT))
            .await?;

        Ok(messages
            .into_iter()
            .find(|message| {
                message.author.id == bot_id
                    && message
                        .embeds
                        .first()
                        .and_then(|embed| embed.title.as_deref())
                        == Some(title)
            })
            .map(|message| message.id))
    }

    async fn grant_role(&self, guild_id: GuildId, user_id: UserId, role_id: RoleId) -> Result<()> {
        self.http
            .add_member_role(guild_id, user_id, role_id, Some(ROLE_AUDIT_REASON))
            .await?;
        Ok(())
    }

    async fn revoke_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<()> {
        self.http
            .remove_member_role(guild_id, user_id, role_id, Some(ROLE_AUDIT_REASON))
            .await?;
        Ok(())
    }
}
