use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::envelope::Envelope;
use crate::error::Result;
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

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub user_id: String,
    pub user_name: String,
    pub email: String,
    pub token: String,
}

/// Handler to open a session. The token is also sent as `Authorization`.
pub async fn handler(
    State(state): State<AppState>,
    State(users): State<UserService>,
    Valid(body): Valid<Body>,
) -> Result<impl IntoResponse> {
    let user = users.authenticate(&body.email, &body.password).await?;
    let token = state.token.create(&user.id)?;
    tracing::debug!(user_id = %user.id, "session opened");

    Ok((
        [(header::AUTHORIZATION, token.clone())],
        Envelope::ok(
            "Signed in.",
            Response {
                user_id: user.id,
                user_name: user.user_name,
                email: user.email,
                token,
            },
        ),
    ))
}
