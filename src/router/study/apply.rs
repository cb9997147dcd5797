use axum::Extension;
use axum::extract::State;
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

/// Handler to apply to a study as the caller.
pub async fn handler(
    State(studies): State<StudyService>,
    Extension(caller): Extension<Caller>,
    Valid(body): Valid<Body>,
) -> Result<Envelope<Study>> {
    let study = studies.apply(&body.study_id, &caller.user_id).await?;

    Ok(Envelope::ok("Application submitted.", study))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::router::study::open_study;
    use crate::router::{envelope, register, state};
    use crate::*;

    #[tokio::test]
    async fn test_apply_handler() {
        let state = state();
        let app = app(state.clone());
        let (owner_id, _) = register(&state, "kim").await;
        let (lee_id, lee) = register(&state, "lee").await;
        let (_, park) = register(&state, "park").await;
        let study_id = open_study(&state, &owner_id, 1).await;

        let body = json!({ "study_id": study_id }).to_string();
        let response = make_request(
            Some(&lee),
            app.clone(),
            Method::POST,
            "/api/study/apply",
            body.clone(),
        )
        .await;
        // The owner alone fills a study of one.
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(envelope(response).await.message, "study is full");

        let study_id = open_study(&state, &owner_id, 3).await;
        let body = json!({ "study_id": study_id }).to_string();
        let response = make_request(
            Some(&lee),
            app.clone(),
            Method::POST,
            "/api/study/apply",
            body.clone(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let data = envelope(response).await.data.unwrap();
        assert_eq!(data["members"][1]["user_id"], lee_id);
        assert_eq!(data["members"][1]["status"], "pending");

        let response = make_request(
            Some(&lee),
            app.clone(),
            Method::POST,
            "/api/study/apply",
            body.clone(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = json!({ "study_id": "000000000000000000000000" }).to_string();
        let response =
            make_request(Some(&park), app, Method::POST, "/api/study/apply", body).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
