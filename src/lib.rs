pub mod app_state;
mod assets;
pub mod configuration;
pub mod cors;
pub mod errors;
pub mod feedback;
pub mod locale;
mod routes;
pub mod telegram;

use crate::app_state::AppState;
use crate::errors::Error;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use configuration::Settings;
use tower_http::trace::TraceLayer;

pub const FEEDBACK_PATH: &str = "/api/feedback";

pub fn create_app(settings: &Settings) -> Result<(Router, AppState), Error> {
    settings.check_if_valid()?;
    let app_state = AppState::init(settings)?;
    let feedback = post(routes::feedback)
        .fallback(routes::method_not_allowed)
        .layer(from_fn_with_state(app_state.clone(), cors::cors));
    let mut app = Router::new()
        .route("/health_check", get(routes::health_check))
        .route(FEEDBACK_PATH, feedback)
        .with_state(app_state.clone());
    if let Some(static_dir) = &settings.application.static_dir {
        app = app.fallback_service(assets::static_files(static_dir));
    }
    Ok((app.layer(TraceLayer::new_for_http()), app_state))
}
