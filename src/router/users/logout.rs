use axum::Extension;
use axum::response::IntoResponse;

use super::clear_session;
use crate::envelope::Envelope;
use crate::error::{Result, ServerError};
use crate::middleware::Caller;

/// Drop session artifacts. Tokens are stateless, so nothing is revoked.
pub async fn handler(caller: Option<Extension<Caller>>) -> Result<impl IntoResponse> {
    let Some(Extension(caller)) = caller else {
        return Err(ServerError::NotFound("session"));
    };
    tracing::debug!(user_id = %caller.user_id, "session closed");

    Ok((clear_session(), Envelope::message("Logged out.")))
}
