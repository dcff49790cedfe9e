use serenity::all::ChannelId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The referenced message, channel or role no longer exists
    #[error("The requested resource no longer exists")]
    NotFound,

    /// A single destination could not receive a message
    #[error("Failed to send to channel {channel}: {reason}")]
    Send { channel: ChannelId, reason: String },

    /// The guild has no target channel or ping role yet
    #[error("This server has no target channel or ping role configured")]
    ConfigurationMissing,

    /// The guild is not present in the cache
    #[error("The server is not available")]
    GuildUnavailable,

    #[error(transparent)]
    Serenity(serenity::Error),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Discord JSON error codes for unknown channel, message and role.
const UNKNOWN_RESOURCE_CODES: [isize; 3] = [10003, 10008, 10011];

impl From<serenity::Error> for Error {
    fn from(value: serenity::Error) -> Self {
        if let serenity::Error::Http(serenity::http::HttpError::UnsuccessfulRequest(response)) =
            &value
        {
            if response.status_code.as_u16() == 404
                || UNKNOWN_RESOURCE_CODES.contains(&response.error.code)
            {
                return Self::NotFound;
            }
        }

        Self::Serenity(value)
    }
}

pub type Result<T> = ::core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::http::{ErrorResponse, HttpError, LightMethod};

    async fn rejected(status: u16, code: isize) -> serenity::Error {
        let response = http::Response::builder()
            .status(status)
            .body(format!(r#"{{"code":{code},"message":"rejected"}}"#))
            .unwrap();
        let response =
            ErrorResponse::from_response(response.into(), LightMethod::Get.reqwest_method()).await;

        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
    }

    #[tokio::test]
    async fn unknown_message_code_is_not_found() {
        assert!(matches!(
            Error::from(rejected(400, 10008).await),
            Error::NotFound
        ));
    }

    #[tokio::test]
    async fn plain_404_is_not_found() {
        assert!(matches!(Error::from(rejected(404, 0).await), Error::NotFound));
    }

    #[tokio::test]
    async fn missing_permissions_stays_a_serenity_error() {
        assert!(matches!(
            Error::from(rejected(403, 50013).await),
            Error::Serenity(_)
        ));
    }
}
