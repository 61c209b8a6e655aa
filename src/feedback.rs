use crate::errors::FeedbackError;
use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

pub const NOTIFICATION_HEADER: &str = "📩 Feedback Baru";

/// A feedback form submission, trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct FeedbackSubmission {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub message: String,
}

impl FeedbackSubmission {
    pub fn new(name: &str, email: &str, message: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            message: message.trim().to_string(),
        }
    }

    /// Text delivered to the bot chat.
    pub fn notification_text(&self) -> String {
        format!(
            "{NOTIFICATION_HEADER}\nNama: {}\nEmail: {}\n\n{}",
            self.name, self.email, self.message
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JsonFields {
    name: Option<Value>,
    email: Option<Value>,
    message: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FormFields {
    name: Option<String>,
    email: Option<String>,
    message: Option<String>,
}

/// Falsy JSON values read as empty text, anything else as its textual form.
fn as_text(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::Number(number)) if number.as_f64() == Some(0.0) => String::new(),
        Some(other) => stringify(&other),
    }
}

// Arrays join their elements with commas, objects have no useful text form.
fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

impl From<JsonFields> for FeedbackSubmission {
    fn from(fields: JsonFields) -> Self {
        Self::new(
            &as_text(fields.name),
            &as_text(fields.email),
            &as_text(fields.message),
        )
    }
}

impl From<FormFields> for FeedbackSubmission {
    fn from(fields: FormFields) -> Self {
        Self::new(
            fields.name.as_deref().unwrap_or_default(),
            fields.email.as_deref().unwrap_or_default(),
            fields.message.as_deref().unwrap_or_default(),
        )
    }
}

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

#[async_trait]
impl<S> FromRequest<S> for FeedbackSubmission
where
    S: Send + Sync,
{
    type Rejection = FeedbackError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&request) {
            let Form(fields) = Form::<FormFields>::from_request(request, state)
                .await
                .map_err(|rejection| FeedbackError::MalformedBody(rejection.body_text()))?;
            return Ok(fields.into());
        }
        let Json(fields) = Json::<JsonFields>::from_request(request, state)
            .await
            .map_err(|rejection| FeedbackError::MalformedBody(rejection.body_text()))?;
        Ok(fields.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_notification_text() {
        let submission = FeedbackSubmission::new("Ana", "a@example.com", "Hi");
        assert_eq!(
            submission.notification_text(),
            "📩 Feedback Baru\nNama: Ana\nEmail: a@example.com\n\nHi"
        );
    }

    #[test]
    fn test_fields_are_trimmed() {
        let submission = FeedbackSubmission::new("  Ana ", "\ta@example.com\n", " multi\nline ");
        assert_eq!(submission.name, "Ana");
        assert_eq!(submission.email, "a@example.com");
        assert_eq!(submission.message, "multi\nline");
        assert!(submission.validate().is_ok());
    }

    #[test]
    fn test_validation_blank_field_fails() {
        let submission = FeedbackSubmission::new("Ana", "   ", "Hi");
        assert!(submission.validate().is_err());
        let submission = FeedbackSubmission::new("", "a@example.com", "Hi");
        assert!(submission.validate().is_err());
    }

    #[test]
    fn test_email_format_is_not_checked() {
        let submission = FeedbackSubmission::new("Ana", "not an email", "Hi");
        assert!(submission.validate().is_ok());
    }

    #[test]
    fn test_json_values_coerced_to_text() {
        let fields: JsonFields =
            serde_json::from_value(json!({"name": 7, "email": null, "message": true})).unwrap();
        let submission = FeedbackSubmission::from(fields);
        assert_eq!(submission.name, "7");
        assert_eq!(submission.email, "");
        assert_eq!(submission.message, "true");

        let fields: JsonFields = serde_json::from_value(json!({"name": 0})).unwrap();
        let submission = FeedbackSubmission::from(fields);
        assert_eq!(submission.name, "");
        assert_eq!(submission.message, "");

        let fields: JsonFields = serde_json::from_value(
            json!({"name": [], "email": {}, "message": ["a", null, 2]}),
        )
        .unwrap();
        let submission = FeedbackSubmission::from(fields);
        assert_eq!(submission.name, "");
        assert_eq!(submission.email, "[object Object]");
        assert_eq!(submission.message, "a,,2");
        assert!(submission.validate().is_err());
    }
}
