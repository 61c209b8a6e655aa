use crate::locale::{Locale, MessageKey, Messages};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::net::AddrParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to load configuration: {0}")]
    ConfigError(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),
    #[error("socket address parsing error: {0}")]
    SocketAddressParsingError(#[from] AddrParseError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("failed to build http client: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("unknown locale {0}")]
    UnknownLocale(String),
    #[error("bot token is not set")]
    MissingBotToken,
    #[error("chat id is not set")]
    MissingChatId,
    #[error("bot api url is invalid: {0}")]
    InvalidApiUrl(#[from] url::ParseError),
    #[error("bot api url must be http or https, got {0}")]
    UnsupportedApiScheme(String),
    #[error("host is not an ip address: {0}")]
    InvalidHost(#[from] AddrParseError),
}

/// Everything that can end a feedback request early.
#[derive(Error, Debug)]
pub enum FeedbackError {
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("invalid submission: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("malformed body: {0}")]
    MalformedBody(String),
    #[error("relay is not configured: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

impl FeedbackError {
    pub fn status(&self) -> StatusCode {
        match self {
            FeedbackError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            FeedbackError::Validation(_) | FeedbackError::MalformedBody(_) => {
                StatusCode::BAD_REQUEST
            }
            FeedbackError::Configuration(_) | FeedbackError::Delivery(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn message_key(&self) -> MessageKey {
        match self {
            FeedbackError::MethodNotAllowed => MessageKey::MethodNotAllowed,
            FeedbackError::Validation(_) | FeedbackError::MalformedBody(_) => {
                MessageKey::FieldsRequired
            }
            FeedbackError::Configuration(_) => MessageKey::NotConfigured,
            FeedbackError::Delivery(_) => MessageKey::DeliveryFailed,
        }
    }
}

impl IntoResponse for FeedbackError {
    fn into_response(self) -> Response {
        Messages::default().reply(self.status(), self.message_key(), Locale::default())
    }
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("bot api responded with {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("bot api request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statuses_follow_taxonomy() {
        assert_eq!(
            FeedbackError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            FeedbackError::MalformedBody("eof".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            FeedbackError::from(ConfigurationError::MissingChatId).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let rejected = DeliveryError::Rejected {
            status: reqwest::StatusCode::FORBIDDEN,
            body: "{\"ok\":false}".to_string(),
        };
        assert_eq!(
            FeedbackError::from(rejected).message_key(),
            MessageKey::DeliveryFailed
        );
    }

    #[tokio::test]
    async fn test_rejection_renders_default_locale_text() {
        let response = FeedbackError::MalformedBody("eof".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], "Semua field wajib diisi.".as_bytes());
    }
}
