//! Error handler for the API.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::envelope::Envelope;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error("email is already registered")]
    DuplicateEmail,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("missing or invalid 'Authorization' header")]
    Unauthorized,

    #[error("caller is not allowed to perform this action")]
    Forbidden,

    #[error("{0}")]
    Conflict(&'static str),

    #[error("SQL request failed: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("internal server error, {details}")]
    Internal {
        details: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ServerError {
    /// Wrap any error into [`ServerError::Internal`].
    pub fn internal<E>(details: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal {
            details: details.into(),
            source: Some(Box::new(err)),
        }
    }

    /// Single field validation failure raised after the request was parsed.
    pub fn invalid_field(field: &'static str, message: &'static str) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(
            field,
            validator::ValidationError::new("invalid").with_message(message.into()),
        );
        Self::Validation(errors)
    }

    /// HTTP status code of the error.
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) | ServerError::Json(_) => {
                StatusCode::BAD_REQUEST
            },
            ServerError::InvalidCredentials | ServerError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            },
            ServerError::Forbidden => StatusCode::FORBIDDEN,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::DuplicateEmail | ServerError::Conflict(_) => {
                StatusCode::CONFLICT
            },
            ServerError::Sql(_) | ServerError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct FieldError {
    field: String,
    message: String,
}

fn parse_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, issues)| {
            issues.iter().map(move |issue| FieldError {
                field: field.to_string(),
                message: issue
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| issue.code.to_string()),
            })
        })
        .collect()
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            ServerError::Validation(errors) => {
                Envelope::new(status, "There were validation errors with your request.")
                    .data(serde_json::json!({
                        "errors": parse_validation_errors(errors),
                    }))
                    .into_response()
            },

            ServerError::Json(rejection) => {
                Envelope::<()>::new(status, rejection.body_text()).into_response()
            },

            ServerError::Sql(err) => {
                tracing::error!(error = %err, "server returned 500 status");
                Envelope::<()>::new(status, "Internal Server Error").into_response()
            },

            ServerError::Internal { details, source } => {
                tracing::error!(err = ?source, %details, "server returned 500 status");
                Envelope::<()>::new(status, "Internal Server Error").into_response()
            },

            _ => Envelope::<()>::new(status, self.to_string()).into_response(),
        }
    }
}
