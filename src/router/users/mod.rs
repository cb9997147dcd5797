//! Users-related HTTP API.
mod delete;
mod get;
mod logout;
mod me;
mod signin;
mod signup;
mod update;

use axum::http::header;
use axum::routing::{get, post};
use axum::{Router, middleware};

use crate::AppState;
use crate::middleware::{Capability, authorize};

/// Headers that drop the session on the client.
fn clear_session() -> [(header::HeaderName, &'static str); 2] {
    [
        (header::AUTHORIZATION, ""),
        (header::SET_COOKIE, "token=; Path=/; Max-Age=0; HttpOnly"),
    ]
}

pub fn router(state: AppState) -> Router<AppState> {
    let authenticated = Router::new()
        // `GET /api/user/me` goes to `me`, `POST` to `update`, `DELETE` to `delete`.
        .route(
            "/api/user/me",
            get(me::handler)
                .post(update::handler)
                .delete(delete::handler),
        )
        .route("/api/user/logout", post(logout::handler))
        .route_layer(middleware::from_fn_with_state(
            (state, Capability::Authenticated),
            authorize,
        ));

    Router::new()
        .route("/api/user/signup", post(signup::handler))
        .route("/api/user/signin", post(signin::handler))
        .route("/api/user/{user_id}", get(get::handler))
        .merge(authenticated)
}
