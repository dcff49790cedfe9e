use serenity::all::Colour;

/// Default accent used by every embed the bot publishes.
pub const DEFAULT_EMBED_COLOR: u32 = 0x0099FF;

pub enum Colors {
    Info = 0x0773D6,
    Success = 0x0BA84D,
    Warning = 0xF0A500,
    Error = 0xFC1F28,
}

impl From<Colors> for Colour {
    fn from(value: Colors) -> Self {
        Colour(value as u32)
    }
}

/// Parses `#RRGGBB`, `0xRRGGBB` or bare `RRGGBB` into a 24-bit colour.
pub fn parse_color(input: &str) -> Option<u32> {
    let input = input.trim();
    let hex = input
        .strip_prefix('#')
        .or_else(|| input.strip_prefix("0x"))
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);

    if hex.is_empty() || hex.len() > 6 {
        return None;
    }

    u32::from_str_radix(hex, 16).ok()
}

pub fn format_color(color: u32) -> String {
    format!("#{color:06X}")
}

pub fn role_mention(role_id: u64) -> String {
    format!("<@&{role_id}>")
}
