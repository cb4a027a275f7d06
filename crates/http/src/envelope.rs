//! Uniform JSON response wrapper.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

fn is_zero(status: &u16) -> bool {
    *status == 0
}

/// Every reply is wrapped in an envelope. Empty fields are left out of the JSON,
/// and the HTTP status line mirrors `status`.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T = ()> {
    #[serde(skip_serializing_if = "is_zero")]
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status: status.as_u16(),
            message: None,
            error: None,
            data: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }
}

impl Envelope {
    /// Success envelope carrying only a message.
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status).with_message(message)
    }

    /// Failure envelope carrying only an error string.
    pub fn error(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(status)
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_fields_are_omitted() {
        let envelope = Envelope::message(StatusCode::OK, "Welcome !");
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"status": 200, "message": "Welcome !"})
        );
    }

    #[test]
    fn error_envelope_has_no_message_or_data() {
        let envelope = Envelope::error(StatusCode::NOT_FOUND, "Not found");
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"status": 404, "error": "Not found"})
        );
    }

    #[test]
    fn status_line_follows_envelope_status() {
        let response = Envelope::new(StatusCode::CREATED)
            .with_message("created")
            .with_data(vec![1, 2, 3])
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
