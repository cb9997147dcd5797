use axum::Extension;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::envelope::Envelope;
use crate::error::Result;
use crate::feedback::{ContentType, Feedback, FeedbackService, NewFeedback};
use crate::middleware::Caller;
use crate::router::Valid;

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct Body {
    #[validate(length(min = 1, message = "Study ID is required."))]
    pub study_id: String,
    /// `false` for a post, `true` for a comment.
    #[serde(default)]
    pub content_type: ContentType,
    #[validate(length(
        min = 1,
        max = 5000,
        message = "Content must be 1 to 5000 characters long."
    ))]
    pub content: String,
}

/// Handler to post feedback. Accepted members only.
pub async fn handler(
    State(feedback): State<FeedbackService>,
    Extension(caller): Extension<Caller>,
    Valid(body): Valid<Body>,
) -> Result<Envelope<Feedback>> {
    let entry = feedback
        .create(
            &caller.user_id,
            NewFeedback {
                study_id: body.study_id,
                content_type: body.content_type,
                content: body.content,
            },
        )
        .await?;

    Ok(Envelope::ok("Feedback posted.", entry))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::router::study::open_study;
    use crate::router::{envelope, register, state};
    use crate::*;

    #[tokio::test]
    async fn test_create_handler() {
        let state = state();
        let app = app(state.clone());
        let (owner_id, owner) = register(&state, "kim").await;
        let (_, lee) = register(&state, "lee").await;
        let study_id = open_study(&state, &owner_id, 3).await;

        let body = json!({
            "study_id": study_id,
            "content_type": true,
            "content": "Answer with the STAR method.",
        })
        .to_string();

        let response = make_request(
            Some(&owner),
            app.clone(),
            Method::POST,
            "/api/feedback/create",
            body.clone(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let data = envelope(response).await.data.unwrap();
        assert_eq!(data["user_name"], "kim");
        assert_eq!(data["content_type"], true);
        assert_eq!(data["study_id"], study_id);

        // Not a member of the study.
        let response = make_request(
            Some(&lee),
            app.clone(),
            Method::POST,
            "/api/feedback/create",
            body,
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = json!({ "study_id": "unknown", "content": "hi" }).to_string();
        let response =
            make_request(Some(&owner), app, Method::POST, "/api/feedback/create", body).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
