//! Study feedback HTTP API.
mod create;
mod delete;
mod get;
mod update;

use axum::routing::{delete, get, post, put};
use axum::{Router, middleware};

use crate::AppState;
use crate::middleware::{Capability, authorize};

pub fn router(state: AppState) -> Router<AppState> {
    let authenticated = Router::new()
        .route("/api/feedback/create", post(create::handler))
        .route("/api/feedback/", put(update::handler))
        .route("/api/feedback/{study_id}", delete(delete::handler))
        .route_layer(middleware::from_fn_with_state(
            (state, Capability::Authenticated),
            authorize,
        ));

    Router::new()
        .route("/api/feedback/", get(get::list))
        .route("/api/feedback/{study_id}", get(get::handler))
        .merge(authenticated)
}
