//! HTTP API.
pub mod community;
pub mod feedback;
pub mod status;
pub mod study;
pub mod users;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::ServerError;
use crate::envelope::Envelope;

/// JSON body checked with [`validator`] before reaching the handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Valid<T>(pub T);

impl<T, S> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Valid(value))
    }
}

/// Deserialize a string without its surrounding whitespace, so validators
/// see what gets stored.
pub fn trimmed<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|value| value.trim().to_owned())
}

/// [`trimmed`] for optional fields.
pub fn trimmed_option<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
        .map(|value| value.map(|value| value.trim().to_owned()))
}

/// Answer unknown routes with an envelope.
pub async fn not_found() -> ServerError {
    ServerError::NotFound("route")
}

/// Answer known routes called with another method.
pub async fn method_not_allowed() -> Envelope<()> {
    Envelope::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed.")
}

/// Give the bodyless `408` of the timeout layer an envelope.
pub async fn timeout_envelope(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return Envelope::<()>::new(StatusCode::REQUEST_TIMEOUT, "Request timed out.")
            .into_response();
    }

    response
}

#[cfg(test)]
pub(crate) fn state() -> crate::AppState {
    use std::sync::Arc;

    crate::AppState {
        config: Arc::new(crate::config::Configuration::default()),
        db: crate::database::Database::memory(),
        pwd: Arc::new(crate::crypto::test_password_manager()),
        token: crate::token::TokenManager::new("https://study.local/", "test-secret"),
        metrics: None,
    }
}

/// Create an account named `name` and return its ID and a session token.
#[cfg(test)]
pub(crate) async fn register(state: &crate::AppState, name: &str) -> (String, String) {
    use axum::extract::FromRef;

    let user = crate::user::UserService::from_ref(state)
        .sign_up(crate::user::NewUser {
            user_name: name.to_owned(),
            email: format!("{name}@test.com"),
            password: "pw1".to_owned(),
            phone_number: None,
        })
        .await
        .unwrap();
    let token = state.token.create(&user.id).unwrap();

    (user.id, token)
}

/// Read an envelope out of a response.
#[cfg(test)]
pub(crate) async fn envelope(
    response: axum::response::Response,
) -> crate::envelope::Envelope {
    use http_body_util::BodyExt;

    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::*;

    #[tokio::test]
    async fn test_unknown_route() {
        let app = app(state());
        let response =
            make_request(None, app, Method::GET, "/api/nothing", String::default()).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(envelope(response).await.result_code, "404");
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let state = state();
        let app = app(state.clone());
        let (_, token) = register(&state, "kim").await;

        let response = make_request(
            Some(&token),
            app,
            Method::PATCH,
            "/api/user/me",
            String::default(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(envelope(response).await.result_code, "405");
    }

    #[tokio::test]
    async fn test_timeout_has_envelope() {
        let response = timeout_envelope(StatusCode::REQUEST_TIMEOUT.into_response()).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(envelope(response).await.result_code, "408");

        let response = timeout_envelope(StatusCode::NO_CONTENT.into_response()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let app = app(state());
        let response = make_request(
            None,
            app,
            Method::POST,
            "/api/user/signup",
            "{not json".into(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(envelope(response).await.result_code, "400");
    }
}
