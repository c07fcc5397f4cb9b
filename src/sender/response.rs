use super::http::HttpResponse;
use reqwest::{Method, StatusCode};
use thiserror::Error;

/// A response was received, but with a status of 400 or above.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "{method} request to {url} failed with status {} ({}){}",
    .status.as_u16(),
    .status.canonical_reason().unwrap_or("Unknown"),
    message_suffix(.message)
)]
pub struct ResponseError {
    pub url: String,
    pub method: Method,
    pub status: StatusCode,
    /// Server message extracted from the response body
    pub message: Option<String>,
}

fn message_suffix(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {message}"),
        None => String::new(),
    }
}

impl ResponseError {
    pub fn new(
        url: impl Into<String>,
        method: Method,
        status: StatusCode,
        message: Option<String>,
    ) -> Self {
        Self {
            url: url.into(),
            method,
            status,
            message: message.filter(|m| !m.is_empty()),
        }
    }

    /// The server rejected the request body as too large (413).
    pub fn is_payload_too_large(&self) -> bool {
        self.status == StatusCode::PAYLOAD_TOO_LARGE
    }
}

/// Extract the server message from an error response body.
///
/// JSON objects carrying a `message` key yield that value, or nothing when
/// it is null; any other non-empty body is returned verbatim.
pub fn extract_message(body: &str) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    let message = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(fields)) => match fields.get("message") {
            Some(serde_json::Value::String(message)) => message.clone(),
            Some(serde_json::Value::Null) => return None,
            None => body.to_string(),
            Some(other) => other.to_string(),
        },
        _ => body.to_string(),
    };

    Some(message).filter(|m| !m.is_empty())
}

/// Classify a response: statuses below 400 pass, everything else becomes a [`ResponseError`].
pub fn check_response(response: &HttpResponse) -> Result<(), ResponseError> {
    if response.status.as_u16() < 400 {
        return Ok(());
    }

    Err(ResponseError::new(
        response.url.clone(),
        response.method.clone(),
        response.status,
        extract_message(&response.text()),
    ))
}
