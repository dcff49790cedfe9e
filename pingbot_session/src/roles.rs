use log::{info, warn};
use pingbot_storage::ConfigStore;
use serenity::all::{ChannelId, GuildId, MessageId, RoleId, UserId};

use crate::{
    error::{Error, Result},
    gateway::Gateway,
    render,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleAction {
    Grant,
    Revoke,
}

impl RoleAction {
    pub fn from_custom_id(custom_id: &str) -> Option<Self> {
        match custom_id {
            render::GET_ROLE_BUTTON => Some(Self::Grant),
            render::REMOVE_ROLE_BUTTON => Some(Self::Revoke),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleOutcome {
    Granted,
    AlreadyHeld,
    Revoked,
    NotHeld,
}

impl RoleOutcome {
    pub fn reply(self) -> &'static str {
        match self {
            Self::Granted => "✅ You have been given the ping role!",
            Self::AlreadyHeld => "❌ You already have the ping role!",
            Self::Revoked => "✅ The ping role has been removed!",
            Self::NotHeld => "❌ You don't have the ping role!",
        }
    }
}

/// Grants or revokes the ping role for a member whose current roles are `held`.
pub async fn apply(
    gateway: &dyn Gateway,
    guild_id: GuildId,
    user_id: UserId,
    held: &[RoleId],
    role_id: RoleId,
    action: RoleAction,
) -> Result<RoleOutcome> {
    let has_role = held.contains(&role_id);

    match action {
        RoleAction::Grant if has_role => Ok(RoleOutcome::AlreadyHeld),
        RoleAction::Revoke if !has_role => Ok(RoleOutcome::NotHeld),
        RoleAction::Grant => {
            gateway.grant_role(guild_id, user_id, role_id).await?;
            Ok(RoleOutcome::Granted)
        }
        RoleAction::Revoke => {
            gateway.revoke_role(guild_id, user_id, role_id).await?;
            Ok(RoleOutcome::Revoked)
        }
    }
}

/// Makes sure the role panel exists in `channel_id`, posting it if the stored
/// one is missing or was deleted.
pub async fn ensure_panel(
    gateway: &dyn Gateway,
    store: &ConfigStore,
    guild_id: GuildId,
    channel_id: ChannelId,
    existing: Option<MessageId>,
) -> Result<MessageId> {
    if let Some(message_id) = existing {
        match gateway.fetch_message(channel_id, message_id).await {
            Ok(()) => return Ok(message_id),
            Err(Error::NotFound) => warn!("Role panel {message_id} in guild {guild_id} is gone"),
            Err(why) => return Err(why),
        }
    }

    let message_id = gateway.send(channel_id, &render::role_panel()).await?;
    info!("Posted role panel in guild {guild_id}");

    store
        .update(guild_id, |config| {
            if config.target_channel_id == Some(channel_id) {
                config.role_message_id = Some(message_id);
            }
        })
        .await?;

    Ok(message_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{configured_store, Call, MockGateway, GUILD, ROLE, STATS_CHANNEL};

    const USER: UserId = UserId::new(77);

    #[test]
    fn button_ids_map_to_actions() {
        assert_eq!(RoleAction::from_custom_id("get_ping_role"), Some(RoleAction::Grant));
        assert_eq!(RoleAction::from_custom_id("remove_ping_role"), Some(RoleAction::Revoke));
        assert_eq!(RoleAction::from_custom_id("something_else"), None);
    }

    #[tokio::test]
    async fn grant_is_skipped_when_role_is_held() {
        let gateway = MockGateway::with_channels(&[]);

        let outcome = apply(&*gateway, GUILD, USER, &[ROLE], ROLE, RoleAction::Grant)
            .await
            .unwrap();

        assert_eq!(outcome, RoleOutcome::AlreadyHeld);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn grant_and_revoke_reach_the_gateway() {
        let gateway = MockGateway::with_channels(&[]);

        let granted = apply(&*gateway, GUILD, USER, &[], ROLE, RoleAction::Grant).await.unwrap();
        let revoked = apply(&*gateway, GUILD, USER, &[ROLE], ROLE, RoleAction::Revoke)
            .await
            .unwrap();
        let absent = apply(&*gateway, GUILD, USER, &[], ROLE, RoleAction::Revoke).await.unwrap();

        assert_eq!(granted, RoleOutcome::Granted);
        assert_eq!(revoked, RoleOutcome::Revoked);
        assert_eq!(absent, RoleOutcome::NotHeld);
        assert_eq!(
            gateway.calls(),
            vec![Call::Grant(USER, ROLE), Call::Revoke(USER, ROLE)]
        );
    }

    #[tokio::test]
    async fn deleted_role_surfaces_as_not_found() {
        let gateway = MockGateway::with_channels(&[]);
        gateway.remove_role(ROLE);

        let result = apply(&*gateway, GUILD, USER, &[], ROLE, RoleAction::Grant).await;
        assert!(matches!(result, Err(Error::NotFound)));
    }

    #[tokio::test]
    async fn panel_is_posted_once_and_reused() {
        let (_dir, store) = configured_store().await;
        let gateway = MockGateway::with_channels(&[]);

        let posted = ensure_panel(&*gateway, &store, GUILD, STATS_CHANNEL, None).await.unwrap();
        assert_eq!(store.get(GUILD).await.unwrap().role_message_id, Some(posted));

        let reused = ensure_panel(&*gateway, &store, GUILD, STATS_CHANNEL, Some(posted))
            .await
            .unwrap();
        assert_eq!(reused, posted);
        assert_eq!(gateway.sends().len(), 1);

        gateway.delete(posted);
        let replaced = ensure_panel(&*gateway, &store, GUILD, STATS_CHANNEL, Some(posted))
            .await
            .unwrap();
        assert_ne!(replaced, posted);
        assert_eq!(store.get(GUILD).await.unwrap().role_message_id, Some(replaced));
    }
}
