use crate::configuration::Settings;
use crate::cors::CorsPolicy;
use crate::errors::Error;
use crate::locale::Messages;
use crate::telegram::BotClient;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub bot: BotClient,
    pub messages: Arc<Messages>,
    pub cors: Option<Arc<CorsPolicy>>,
}

impl AppState {
    pub fn init(settings: &Settings) -> Result<Self, Error> {
        let cors = settings
            .cors
            .enabled
            .then(|| Arc::new(CorsPolicy::new(&settings.cors.allowed_origins)));
        Ok(Self {
            settings: Arc::new(settings.clone()),
            bot: BotClient::try_from_settings(&settings.telegram)?,
            messages: Arc::new(Messages::default()),
            cors,
        })
    }
}
