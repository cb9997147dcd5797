use axum::Extension;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::envelope::Envelope;
use crate::error::Result;
use crate::feedback::{ContentType, Feedback, FeedbackChanges, FeedbackService};
use crate::middleware::Caller;
use crate::router::Valid;

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct Body {
    #[validate(length(min = 1, message = "Feedback ID is required."))]
    pub feedback_id: String,
    #[validate(length(
        min = 1,
        max = 5000,
        message = "Content must be 1 to 5000 characters long."
    ))]
    pub content: Option<String>,
    pub content_type: Option<ContentType>,
}

/// Handler to edit feedback. Author only.
pub async fn handler(
    State(feedback): State<FeedbackService>,
    Extension(caller): Extension<Caller>,
    Valid(body): Valid<Body>,
) -> Result<Envelope<Feedback>> {
    let changes = FeedbackChanges {
        content: body.content,
        content_type: body.content_type,
    };

    let outcome = feedback
        .update(&caller.user_id, &body.feedback_id, changes)
        .await?;

    Ok(Envelope::updated("Feedback updated.", outcome))
}

#[cfg(test)]
mod tests {
    use axum::extract::FromRef;
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::feedback::{ContentType, FeedbackService, NewFeedback};
    use crate::router::study::open_study;
    use crate::router::{envelope, register, state};
    use crate::*;

    #[tokio::test]
    async fn test_update_handler() {
        let state = state();
        let app = app(state.clone());
        let (owner_id, owner) = register(&state, "kim").await;
        let (_, lee) = register(&state, "lee").await;
        let study_id = open_study(&state, &owner_id, 3).await;
        let entry = FeedbackService::from_ref(&state)
            .create(
                &owner_id,
                NewFeedback {
                    study_id,
                    content_type: ContentType::Post,
                    content: "draft".into(),
                },
            )
            .await
            .unwrap();

        let body = json!({ "feedback_id": entry.id, "content": "final" }).to_string();
        let response = make_request(
            Some(&lee),
            app.clone(),
            Method::PUT,
            "/api/feedback/",
            body.clone(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = make_request(
            Some(&owner),
            app.clone(),
            Method::PUT,
            "/api/feedback/",
            body.clone(),
        )
        .await;
        let updated = envelope(response).await;
        assert_eq!(updated.message, "Feedback updated.");
        assert_eq!(updated.data.unwrap()["content"], "final");

        let response =
            make_request(Some(&owner), app.clone(), Method::PUT, "/api/feedback/", body).await;
        assert_eq!(envelope(response).await.message, "No changes.");

        let body = json!({ "feedback_id": "unknown", "content": "x" }).to_string();
        let response =
            make_request(Some(&owner), app, Method::PUT, "/api/feedback/", body).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
