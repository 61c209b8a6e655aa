use crate::errors::ConfigurationError;
use crate::locale::Locale;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, FileFormat};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, DurationSeconds};
use std::env::var;
use std::fmt::{Debug, Formatter};
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Environment variables that override single keys of the file based settings.
const ENV_OVERRIDES: [(&str, &str); 3] = [
    ("PORT", "application.port"),
    ("TELEGRAM_BOT_TOKEN", "telegram.bot_token"),
    ("TELEGRAM_CHAT_ID", "telegram.chat_id"),
];
const ALLOWED_ORIGINS_ENV: &str = "ALLOWED_ORIGINS";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Settings {
    pub application: Application,
    #[serde(default)]
    pub telegram: TelegramSettings,
    #[serde(default)]
    pub cors: CorsSettings,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Application {
    pub host: String,
    pub port: u16,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub static_dir: Option<String>,
}

impl Default for Application {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            locale: Locale::default(),
            static_dir: None,
        }
    }
}

#[serde_as]
#[derive(Serialize, Deserialize, Clone)]
pub struct TelegramSettings {
    #[serde(default = "default_api_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde_as(as = "Option<DurationSeconds<u64>>")]
    #[serde(default)]
    pub timeout: Option<Duration>,
    #[serde(default)]
    pub prefer_ipv4: bool,
}

fn default_api_url() -> String {
    TELEGRAM_API_URL.to_string()
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_url(),
            bot_token: None,
            chat_id: None,
            timeout: None,
            prefer_ipv4: false,
        }
    }
}

// The token is a secret, keep it out of logs.
impl Debug for TelegramSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("api_base_url", &self.api_base_url)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .field("timeout", &self.timeout)
            .field("prefer_ipv4", &self.prefer_ipv4)
            .finish()
    }
}

/// Credentials needed for a single `sendMessage` call.
#[derive(Clone, Copy)]
pub struct Credentials<'a> {
    pub bot_token: &'a str,
    pub chat_id: &'a str,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl TelegramSettings {
    /// Checked on every request, so a missing secret fails the request and not the process.
    pub fn credentials(&self) -> Result<Credentials<'_>, ConfigurationError> {
        let bot_token = non_empty(&self.bot_token).ok_or(ConfigurationError::MissingBotToken)?;
        let chat_id = non_empty(&self.chat_id).ok_or(ConfigurationError::MissingChatId)?;
        Ok(Credentials { bot_token, chat_id })
    }

    pub fn check_if_valid(&self) -> Result<(), ConfigurationError> {
        let url = Url::parse(&self.api_base_url)?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigurationError::UnsupportedApiScheme(other.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CorsSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec![],
        }
    }
}

impl Settings {
    pub fn check_if_valid(&self) -> Result<(), ConfigurationError> {
        IpAddr::from_str(&self.application.host)?;
        self.telegram.check_if_valid()
    }
}

/// The possible runtime environment for our application.
#[derive(Debug, Eq, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            other => Err(format!(
                "{other} is not a supported environment. Use either `dev` or `prod`."
            )),
        }
    }
}

pub fn get_env() -> Result<Environment, ConfigError> {
    var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "dev".into())
        .try_into()
        .map_err(ConfigError::Message)
}

/// Comma separated origin list, blanks dropped and trailing slashes removed.
pub fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn with_env_overrides<F>(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: F,
) -> Result<ConfigBuilder<DefaultState>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    for (env_key, key) in ENV_OVERRIDES {
        if let Some(value) = lookup(env_key) {
            builder = builder.set_override(key, value)?;
        }
    }
    if let Some(origins) = lookup(ALLOWED_ORIGINS_ENV) {
        builder = builder.set_override("cors.allowed_origins", parse_origins(&origins))?;
    }
    Ok(builder)
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let environment = get_env()?;
    let second_source = format!("configuration/{}", environment.as_str());
    let builder = Config::builder()
        .add_source(config::File::new("configuration/base", FileFormat::Yaml))
        .add_source(config::File::new(&second_source, FileFormat::Yaml).required(false));
    let settings = with_env_overrides(builder, |key| var(key).ok())?.build()?;
    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base() -> ConfigBuilder<DefaultState> {
        Config::builder()
            .set_default("application.host", "127.0.0.1")
            .unwrap()
            .set_default("application.port", 3000)
            .unwrap()
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" https://a.dev/, ,https://b.dev "),
            vec!["https://a.dev".to_string(), "https://b.dev".to_string()]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_env_overrides_apply() {
        let env = HashMap::from([
            ("PORT", "8080"),
            ("TELEGRAM_BOT_TOKEN", "123:ABC"),
            ("TELEGRAM_CHAT_ID", "42"),
            ("ALLOWED_ORIGINS", "https://a.dev,https://b.dev"),
        ]);
        let settings: Settings = with_env_overrides(base(), |key| {
            env.get(key).map(|value| value.to_string())
        })
        .unwrap()
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap();
        assert_eq!(settings.application.port, 8080);
        assert_eq!(settings.application.locale, Locale::Id);
        let credentials = settings.telegram.credentials().unwrap();
        assert_eq!(credentials.bot_token, "123:ABC");
        assert_eq!(credentials.chat_id, "42");
        assert_eq!(settings.telegram.api_base_url, TELEGRAM_API_URL);
        assert!(settings.cors.enabled);
        assert_eq!(settings.cors.allowed_origins.len(), 2);
    }

    #[test]
    fn test_defaults_without_env() {
        let settings: Settings = with_env_overrides(base(), |_| None)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.application.port, 3000);
        assert!(settings.cors.allowed_origins.is_empty());
        assert!(matches!(
            settings.telegram.credentials(),
            Err(ConfigurationError::MissingBotToken)
        ));
    }

    #[test]
    fn test_blank_credentials_are_missing() {
        let telegram = TelegramSettings {
            bot_token: Some("123:ABC".to_string()),
            chat_id: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            telegram.credentials(),
            Err(ConfigurationError::MissingChatId)
        ));
    }

    #[test]
    fn test_check_if_valid() {
        let mut settings = Settings::default();
        assert!(settings.check_if_valid().is_ok());
        settings.telegram.api_base_url = "ftp://api.telegram.org".to_string();
        assert!(settings.check_if_valid().is_err());
        settings.telegram.api_base_url = TELEGRAM_API_URL.to_string();
        settings.application.host = "localhost".to_string();
        assert!(settings.check_if_valid().is_err());
    }

    #[test]
    fn test_debug_hides_token() {
        let telegram = TelegramSettings {
            bot_token: Some("123:SECRET".to_string()),
            ..Default::default()
        };
        assert!(!format!("{telegram:?}").contains("SECRET"));
    }
}
