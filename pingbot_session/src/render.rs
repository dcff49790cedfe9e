use std::time::Duration;

use pingbot_stats::RateSnapshot;
use pingbot_storage::EmbedStyle;
use pingbot_utils::discord::{role_mention, DEFAULT_EMBED_COLOR};
use serenity::all::RoleId;

use crate::gateway::{Button, ButtonStyle, EmbedField, EmbedPayload, MessagePayload};

pub const DEFAULT_STATS_TITLE: &str = "📊 Ping Statistics";
pub const DEFAULT_STATS_DESCRIPTION: &str = "Here is the number of pings sent:";
pub const ROLE_PANEL_TITLE: &str = "🔔 Ping Role";
pub const GET_ROLE_BUTTON: &str = "get_ping_role";
pub const REMOVE_ROLE_BUTTON: &str = "remove_ping_role";

pub fn stats_title(style: &EmbedStyle) -> &str {
    style.title.as_deref().unwrap_or(DEFAULT_STATS_TITLE)
}

/// The stats message is a pure function of the snapshot, the guild's style and
/// the refresh cadence.
pub fn stats_message(
    snapshot: &RateSnapshot,
    style: &EmbedStyle,
    refresh_every: Duration,
) -> MessagePayload {
    let field = |name: &str, value: String, inline: bool| EmbedField {
        name: name.to_string(),
        value,
        inline,
    };

    MessagePayload {
        embed: Some(EmbedPayload {
            title: stats_title(style).to_string(),
            description: Some(
                style
                    .description
                    .clone()
                    .unwrap_or_else(|| DEFAULT_STATS_DESCRIPTION.to_string()),
            ),
            color: style.color.unwrap_or(DEFAULT_EMBED_COLOR),
            fields: vec![
                field("🕐 Per second", format!("≈ {} pings/s", snapshot.per_second), true),
                field("⏰ Per minute", format!("≈ {} pings/min", snapshot.per_minute), true),
                field("⏳ Per hour", format!("≈ {} pings/h", snapshot.per_hour), true),
                field("📈 Total", format!("{} pings (1h)", snapshot.retained), false),
            ],
            footer: Some(format!(
                "Statistics updated {}",
                describe_interval(refresh_every)
            )),
            timestamp: true,
        }),
        ..Default::default()
    }
}

/// A role mention, with the guild's custom embed attached when one is set.
pub fn ping_message(role_id: RoleId, style: &EmbedStyle) -> MessagePayload {
    let embed = (!style.is_empty()).then(|| EmbedPayload {
        title: style.title.clone().unwrap_or_default(),
        description: style.description.clone(),
        color: style.color.unwrap_or(DEFAULT_EMBED_COLOR),
        fields: Vec::new(),
        footer: None,
        timestamp: false,
    });

    MessagePayload {
        content: Some(role_mention(role_id.get())),
        embed,
        buttons: Vec::new(),
    }
}

pub fn role_panel() -> MessagePayload {
    MessagePayload {
        content: None,
        embed: Some(EmbedPayload {
            title: ROLE_PANEL_TITLE.to_string(),
            description: Some(
                "Use the buttons below to get or remove the ping role!".to_string(),
            ),
            color: DEFAULT_EMBED_COLOR,
            fields: Vec::new(),
            footer: None,
            timestamp: true,
        }),
        buttons: vec![
            Button {
                custom_id: GET_ROLE_BUTTON.to_string(),
                label: "Get Ping Role".to_string(),
                style: ButtonStyle::Primary,
            },
            Button {
                custom_id: REMOVE_ROLE_BUTTON.to_string(),
                label: "Remove Ping Role".to_string(),
                style: ButtonStyle::Danger,
            },
        ],
    }
}

pub fn describe_interval(interval: Duration) -> String {
    let secs = interval.as_secs();

    match secs {
        0 => format!("every {} ms", interval.as_millis()),
        1 => "every second".to_string(),
        60 => "every minute".to_string(),
        3600 => "every hour".to_string(),
        s if s % 3600 == 0 => format!("every {} hours", s / 3600),
        s if s % 60 == 0 => format!("every {} minutes", s / 60),
        s => format!("every {s} seconds"),
    }
}
