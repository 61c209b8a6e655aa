use crate::app_state::AppState;
use crate::errors::ConfigurationError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    #[default]
    Id,
    En,
}

impl Display for Locale {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Locale::Id => write!(f, "id"),
            Locale::En => write!(f, "en"),
        }
    }
}

impl FromStr for Locale {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" => Ok(Locale::Id),
            "en" => Ok(Locale::En),
            other => Err(ConfigurationError::UnknownLocale(other.to_string())),
        }
    }
}

impl Locale {
    /// First supported language of an `Accept-Language` header, in listed order.
    /// Ranges weighted `q=0` are refused by the client and skipped.
    pub fn negotiate(accept_language: &str) -> Option<Locale> {
        accept_language
            .split(',')
            .filter_map(|range| {
                let mut parts = range.split(';');
                let tag = parts.next()?.trim();
                let refused = parts.any(|param| {
                    param
                        .trim()
                        .strip_prefix("q=")
                        .and_then(|q| q.trim().parse::<f32>().ok())
                        .is_some_and(|q| q <= 0.0)
                });
                (!refused).then_some(tag)
            })
            .filter_map(|tag| tag.split('-').next())
            .find_map(|primary| primary.parse().ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Sent,
    FieldsRequired,
    NotConfigured,
    DeliveryFailed,
    MethodNotAllowed,
}

const TRANSLATIONS: &[(MessageKey, Locale, &str)] = &[
    (MessageKey::Sent, Locale::Id, "Feedback terkirim."),
    (MessageKey::Sent, Locale::En, "Feedback sent."),
    (MessageKey::FieldsRequired, Locale::Id, "Semua field wajib diisi."),
    (MessageKey::FieldsRequired, Locale::En, "All fields are required."),
    (MessageKey::NotConfigured, Locale::Id, "Telegram belum dikonfigurasi."),
    (MessageKey::NotConfigured, Locale::En, "Telegram is not configured."),
    (MessageKey::DeliveryFailed, Locale::Id, "Gagal mengirim feedback."),
    (MessageKey::DeliveryFailed, Locale::En, "Failed to send feedback."),
    (MessageKey::MethodNotAllowed, Locale::Id, "Method Not Allowed"),
    (MessageKey::MethodNotAllowed, Locale::En, "Method Not Allowed"),
];

/// User-facing strings keyed by message and locale.
#[derive(Debug, Clone)]
pub struct Messages {
    table: HashMap<MessageKey, HashMap<Locale, &'static str>>,
}

impl Default for Messages {
    fn default() -> Self {
        let mut table: HashMap<MessageKey, HashMap<Locale, &'static str>> = HashMap::new();
        for (key, locale, text) in TRANSLATIONS {
            table.entry(*key).or_default().insert(*locale, *text);
        }
        Self { table }
    }
}

impl Messages {
    pub fn text(&self, key: MessageKey, locale: Locale) -> &'static str {
        self.table
            .get(&key)
            .and_then(|texts| texts.get(&locale).or_else(|| texts.get(&Locale::default())))
            .copied()
            .unwrap_or_default()
    }

    pub fn reply(&self, status: StatusCode, key: MessageKey, locale: Locale) -> Response {
        (status, self.text(key, locale)).into_response()
    }
}

/// Response locale picked from `Accept-Language`, falling back to the configured one.
#[derive(Debug, Clone, Copy)]
pub struct RequestLocale(pub Locale);

#[async_trait]
impl FromRequestParts<AppState> for RequestLocale {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .and_then(Locale::negotiate)
            .unwrap_or(state.settings.application.locale);
        Ok(Self(locale))
    }
}
