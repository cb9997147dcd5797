//! Uniform `{resultCode, message, data?}` response body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::patch::Outcome;

/// Message of an update that wrote nothing.
pub const NO_CHANGES: &str = "No changes.";

/// JSON body shared by every response, success or failure.
///
/// `resultCode` always carries the HTTP status of the response.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T = serde_json::Value> {
    pub result_code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Create an envelope for a given status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            result_code: status.as_u16().to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// `200 OK` carrying `data`.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::OK, message).data(data)
    }

    /// Attach a payload.
    pub fn data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    /// HTTP status matching `resultCode`.
    pub fn status(&self) -> StatusCode {
        self.result_code
            .parse::<u16>()
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl<T> Envelope<T> {
    /// `200 OK` answering an update: `message` when something was written,
    /// `No changes.` otherwise.
    pub fn updated(message: impl Into<String>, outcome: Outcome<T>) -> Self {
        let message = if outcome.is_modified() {
            message.into()
        } else {
            NO_CHANGES.to_owned()
        };

        Self::ok(message, outcome.into_inner())
    }
}

impl Envelope<()> {
    /// `200 OK` without payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, message)
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_result_code() {
        let envelope = Envelope::<()>::new(StatusCode::NOT_FOUND, "missing");
        assert_eq!(envelope.result_code, "404");
        assert_eq!(envelope.status(), StatusCode::NOT_FOUND);

        let envelope = Envelope::<()> {
            result_code: "abc".into(),
            message: String::default(),
            data: None,
        };
        assert_eq!(envelope.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_data_is_omitted_when_absent() {
        let body = serde_json::to_value(Envelope::message("bye")).unwrap();
        assert_eq!(body, serde_json::json!({"resultCode": "200", "message": "bye"}));
    }

    #[test]
    fn test_update_message() {
        let envelope = Envelope::updated("Study updated.", Outcome::Updated(1));
        assert_eq!(envelope.message, "Study updated.");

        let envelope = Envelope::updated("Study updated.", Outcome::Unmodified(1));
        assert_eq!(envelope.message, NO_CHANGES);
        assert_eq!(envelope.data, Some(1));
        assert_eq!(envelope.result_code, "200");
    }
}
