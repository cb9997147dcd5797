//! Study and membership HTTP API.
mod accept;
mod apply;
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
        .route("/api/study/create", post(create::handler))
        .route("/api/study/apply", post(apply::handler))
        // `DELETE /api/study/` lets the caller leave a study.
        .route("/api/study/", delete(delete::leave))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), Capability::Authenticated),
            authorize,
        ));

    let owner = Router::new()
        .route(
            "/api/study/accept/{study_id}/{member_id}",
            put(accept::handler),
        )
        .route("/api/study/info/{study_id}", put(update::handler))
        .route(
            "/api/study/{study_id}/{member_id}",
            delete(delete::remove_member),
        )
        .route("/api/study/{study_id}", delete(delete::handler))
        .route_layer(middleware::from_fn_with_state(
            (state, Capability::StudyOwner),
            authorize,
        ));

    Router::new()
        .route("/api/study/info", get(get::list))
        .route("/api/study/info/{study_id}", get(get::handler))
        .merge(authenticated)
        .merge(owner)
}

/// Open a study owned by `owner_id` and return its ID.
#[cfg(test)]
pub(crate) async fn open_study(state: &AppState, owner_id: &str, capacity: i32) -> String {
    use axum::extract::FromRef;

    crate::study::StudyService::from_ref(state)
        .create(
            owner_id,
            crate::study::NewStudy {
                title: "algorithms".into(),
                description: "weekly problems".into(),
                capacity,
            },
        )
        .await
        .unwrap()
        .id
}
