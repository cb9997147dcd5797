use axum::Extension;
use axum::extract::{Path, State};

use crate::envelope::Envelope;
use crate::error::Result;
use crate::study::{Study, StudyService};

/// Handler to accept a pending application. Owner only.
pub async fn handler(
    State(studies): State<StudyService>,
    Extension(study): Extension<Study>,
    Path((_, member_id)): Path<(String, String)>,
) -> Result<Envelope<Study>> {
    let study = studies.accept(study, &member_id).await?;

    Ok(Envelope::ok("Member accepted.", study))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::router::study::open_study;
    use crate::router::{envelope, register, state};
    use crate::*;

    #[tokio::test]
    async fn test_accept_handler() {
        let state = state();
        let app = app(state.clone());
        let (owner_id, owner) = register(&state, "kim").await;
        let (lee_id, lee) = register(&state, "lee").await;
        let study_id = open_study(&state, &owner_id, 2).await;

        let body = json!({ "study_id": study_id }).to_string();
        make_request(Some(&lee), app.clone(), Method::POST, "/api/study/apply", body).await;

        let path = format!("/api/study/accept/{study_id}/{lee_id}");

        // Applicants cannot accept themselves.
        let response =
            make_request(Some(&lee), app.clone(), Method::PUT, &path, String::default())
                .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response =
            make_request(Some(&owner), app.clone(), Method::PUT, &path, String::default())
                .await;
        assert_eq!(response.status(), StatusCode::OK);
        let data = envelope(response).await.data.unwrap();
        assert_eq!(data["members"][1]["status"], "accepted");

        // Nothing is pending anymore.
        let response =
            make_request(Some(&owner), app.clone(), Method::PUT, &path, String::default())
                .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let path = format!("/api/study/accept/unknown/{lee_id}");
        let response =
            make_request(Some(&owner), app, Method::PUT, &path, String::default()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
