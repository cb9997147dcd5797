//! Middlewares for routes.

use std::collections::HashMap;

use axum::extract::{FromRef, Path, Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::study::StudyService;

const BEARER: &str = "Bearer";
/// Cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";
const STUDY_ID: &str = "study_id";

/// What a route requires from its caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    /// A valid session token.
    Authenticated,
    /// A valid session token of the owner of the `{study_id}` study.
    StudyOwner,
}

/// Identity resolved from the session token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
}

/// Remove the `Bearer` scheme, whatever its case. A bare token is kept.
fn strip_bearer(value: &str) -> &str {
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case(BEARER) => token,
        None if value.eq_ignore_ascii_case(BEARER) => "",
        _ => value,
    }
}

/// Read the session token from `Authorization` or the `token` cookie.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| strip_bearer(value.trim()).trim())
        .filter(|token| !token.is_empty());
    if let Some(token) = from_header {
        return Some(token.to_owned());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_owned())
}

/// Custom middleware for authorization.
///
/// Attaches a [`Caller`] to the request and, for [`Capability::StudyOwner`],
/// the loaded [`crate::study::Study`].
pub async fn authorize(
    State((state, capability)): State<(AppState, Capability)>,
    params: Option<Path<HashMap<String, String>>>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let token = session_token(req.headers()).ok_or(ServerError::Unauthorized)?;
    let claims = state.token.decode(&token)?;

    // Tokens of deleted accounts stay signed until they expire.
    if state.db.users.find_by_id(&claims.sub).await?.is_none() {
        tracing::debug!(user_id = %claims.sub, "token refers to an unknown user");
        return Err(ServerError::Unauthorized);
    }

    if capability == Capability::StudyOwner {
        let study_id = params
            .as_ref()
            .and_then(|Path(params)| params.get(STUDY_ID))
            .ok_or(ServerError::NotFound("study"))?;

        let study = StudyService::from_ref(&state)
            .authorize_owner(study_id, &claims.sub)
            .await?;
        req.extensions_mut().insert(study);
    }

    req.extensions_mut().insert(Caller {
        user_id: claims.sub,
    });
    Ok(next.run(req).await)
}
