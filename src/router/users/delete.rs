//! Hard delete the caller's account.

use axum::Extension;
use axum::extract::State;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::clear_session;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::middleware::Caller;
use crate::router::Valid;
use crate::user::UserService;

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct Body {
    #[validate(custom(
        function = "crate::crypto::email_format",
        message = "Email must be formatted."
    ))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

pub async fn handler(
    State(users): State<UserService>,
    Extension(caller): Extension<Caller>,
    Valid(body): Valid<Body>,
) -> Result<impl IntoResponse> {
    users
        .delete(&caller.user_id, &body.email, &body.password)
        .await?;

    Ok((clear_session(), Envelope::message("Account deleted.")))
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header};
    use serde_json::json;

    use crate::router::{register, state};
    use crate::*;

    #[tokio::test]
    async fn test_delete_handler() {
        let state = state();
        let app = app(state.clone());
        let (user_id, token) = register(&state, "kim").await;

        let body = json!({ "email": "kim@test.com", "password": "nope" }).to_string();
        let response = make_request(
            Some(&token),
            app.clone(),
            Method::DELETE,
            "/api/user/me",
            body,
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = json!({ "email": "kim@test.com", "password": "pw1" }).to_string();
        let response = make_request(
            Some(&token),
            app.clone(),
            Method::DELETE,
            "/api/user/me",
            body,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::AUTHORIZATION], "");
        assert!(
            response.headers()[header::SET_COOKIE]
                .to_str()
                .unwrap()
                .contains("Max-Age=0")
        );

        // The token outlives the account but no longer opens a session.
        let response = make_request(
            Some(&token),
            app.clone(),
            Method::GET,
            "/api/user/me",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let path = format!("/api/user/{user_id}");
        let response = make_request(None, app, Method::GET, &path, String::default()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
