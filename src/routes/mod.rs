use crate::app_state::AppState;
use crate::errors::FeedbackError;
use crate::feedback::FeedbackSubmission;
use crate::locale::{MessageKey, RequestLocale};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, info, warn};
use validator::Validate;

pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn feedback(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    submission: Result<FeedbackSubmission, FeedbackError>,
) -> Response {
    match relay(&state, submission).await {
        Ok(()) => {
            info!("feedback relayed to bot chat");
            state.messages.reply(StatusCode::OK, MessageKey::Sent, locale)
        }
        Err(err) => {
            match &err {
                FeedbackError::Delivery(_) => error!(error = %err, "failed to relay feedback"),
                FeedbackError::Configuration(_) => error!(error = %err, "feedback rejected"),
                _ => warn!(error = %err, "feedback rejected"),
            }
            state.messages.reply(err.status(), err.message_key(), locale)
        }
    }
}

async fn relay(
    state: &AppState,
    submission: Result<FeedbackSubmission, FeedbackError>,
) -> Result<(), FeedbackError> {
    let submission = submission?;
    submission.validate()?;
    let credentials = state.settings.telegram.credentials()?;
    state
        .bot
        .send_message(credentials, &submission.notification_text())
        .await?;
    Ok(())
}

pub async fn method_not_allowed(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
) -> Response {
    let err = FeedbackError::MethodNotAllowed;
    state.messages.reply(err.status(), err.message_key(), locale)
}
