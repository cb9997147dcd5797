//! Leave a study, remove one of its members or delete it.

use axum::Extension;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::envelope::Envelope;
use crate::error::Result;
use crate::middleware::Caller;
use crate::router::Valid;
use crate::study::{Study, StudyService};

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct Body {
    #[validate(length(min = 1, message = "Study ID is required."))]
    pub study_id: String,
}

/// The caller withdraws their membership or application.
pub async fn leave(
    State(studies): State<StudyService>,
    Extension(caller): Extension<Caller>,
    Valid(body): Valid<Body>,
) -> Result<Envelope<()>> {
    studies.leave(&body.study_id, &caller.user_id).await?;

    Ok(Envelope::message("Left the study."))
}

/// Owner only.
pub async fn remove_member(
    State(studies): State<StudyService>,
    Extension(study): Extension<Study>,
    Path((_, member_id)): Path<(String, String)>,
) -> Result<Envelope<()>> {
    studies.remove_member(&study, &member_id).await?;

    Ok(Envelope::message("Member removed."))
}

/// Owner only. Members and feedback go with the study.
pub async fn handler(
    State(studies): State<StudyService>,
    Extension(study): Extension<Study>,
) -> Result<Envelope<()>> {
    studies.delete(&study).await?;

    Ok(Envelope::message("Study deleted."))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::router::study::open_study;
    use crate::router::{register, state};
    use crate::*;

    async fn apply(app: &Router, token: &str, study_id: &str) {
        let body = json!({ "study_id": study_id }).to_string();
        let response =
            make_request(Some(token), app.clone(), Method::POST, "/api/study/apply", body)
                .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_leave_handler() {
        let state = state();
        let app = app(state.clone());
        let (owner_id, owner) = register(&state, "kim").await;
        let (_, lee) = register(&state, "lee").await;
        let study_id = open_study(&state, &owner_id, 3).await;
        apply(&app, &lee, &study_id).await;

        let body = json!({ "study_id": study_id }).to_string();
        for (token, status) in [
            (&lee, StatusCode::OK),
            (&lee, StatusCode::NOT_FOUND),
            (&owner, StatusCode::CONFLICT),
        ] {
            let response = make_request(
                Some(token),
                app.clone(),
                Method::DELETE,
                "/api/study/",
                body.clone(),
            )
            .await;
            assert_eq!(response.status(), status);
        }
    }

    #[tokio::test]
    async fn test_remove_member_handler() {
        let state = state();
        let app = app(state.clone());
        let (owner_id, owner) = register(&state, "kim").await;
        let (lee_id, lee) = register(&state, "lee").await;
        let study_id = open_study(&state, &owner_id, 3).await;
        apply(&app, &lee, &study_id).await;

        let path = format!("/api/study/{study_id}/{lee_id}");
        for (token, status) in [
            (&lee, StatusCode::FORBIDDEN),
            (&owner, StatusCode::OK),
            (&owner, StatusCode::NOT_FOUND),
        ] {
            let response =
                make_request(Some(token), app.clone(), Method::DELETE, &path, String::default())
                    .await;
            assert_eq!(response.status(), status);
        }

        let path = format!("/api/study/{study_id}/{owner_id}");
        let response =
            make_request(Some(&owner), app, Method::DELETE, &path, String::default()).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = state();
        let app = app(state.clone());
        let (owner_id, owner) = register(&state, "kim").await;
        let (_, lee) = register(&state, "lee").await;
        let study_id = open_study(&state, &owner_id, 3).await;
        let path = format!("/api/study/{study_id}");

        let response =
            make_request(Some(&lee), app.clone(), Method::DELETE, &path, String::default())
                .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response =
            make_request(Some(&owner), app.clone(), Method::DELETE, &path, String::default())
                .await;
        assert_eq!(response.status(), StatusCode::OK);

        let path = format!("/api/study/info/{study_id}");
        let response = make_request(None, app, Method::GET, &path, String::default()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
