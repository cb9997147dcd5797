//! Community board HTTP API.
mod create;
mod delete;
mod get;
mod update;

use axum::routing::{get, post, put};
use axum::{Router, middleware};

use crate::AppState;
use crate::middleware::{Capability, authorize};

pub fn router(state: AppState) -> Router<AppState> {
    let authenticated = Router::new()
        .route("/api/community/", post(create::handler))
        .route(
            "/api/community/{post_id}",
            put(update::handler).delete(delete::handler),
        )
        .route_layer(middleware::from_fn_with_state(
            (state, Capability::Authenticated),
            authorize,
        ));

    Router::new()
        .route("/api/community/", get(get::list))
        .route("/api/community/{post_id}", get(get::handler))
        .merge(authenticated)
}
