use crate::configuration::{Credentials, TelegramSettings};
use crate::errors::DeliveryError;
use reqwest::redirect::Policy;
use reqwest::Client;
use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr};
use tracing::debug;

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Thin client for the bot API `sendMessage` method.
#[derive(Debug, Clone)]
pub struct BotClient {
    client: Client,
    api_base_url: String,
}

impl BotClient {
    pub fn try_from_settings(settings: &TelegramSettings) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().redirect(Policy::none());
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        if settings.prefer_ipv4 {
            builder = builder.local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        }
        Ok(Self {
            client: builder.build()?,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn send_message_url(&self, bot_token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base_url, bot_token)
    }

    /// One POST, no retries. Errors never carry the request url since it holds the token.
    pub async fn send_message(
        &self,
        credentials: Credentials<'_>,
        text: &str,
    ) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.send_message_url(credentials.bot_token))
            .json(&SendMessage {
                chat_id: credentials.chat_id,
                text,
            })
            .send()
            .await
            .map_err(|err| DeliveryError::Transport(err.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|err| DeliveryError::Transport(err.without_url()))?;
            return Err(DeliveryError::Rejected { status, body });
        }
        debug!(%status, chat_id = credentials.chat_id, "bot api accepted message");
        Ok(())
    }
}
