use axum::Extension;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::envelope::Envelope;
use crate::error::Result;
use crate::feedback::FeedbackService;
use crate::middleware::Caller;
use crate::router::Valid;

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct Body {
    #[validate(length(min = 1, message = "Feedback ID is required."))]
    pub feedback_id: String,
}

/// Handler to delete feedback of a study. Author or study owner only.
pub async fn handler(
    State(feedback): State<FeedbackService>,
    Extension(caller): Extension<Caller>,
    Path(study_id): Path<String>,
    Valid(body): Valid<Body>,
) -> Result<Envelope<()>> {
    feedback
        .delete(&study_id, &body.feedback_id, &caller.user_id)
        .await?;

    Ok(Envelope::message("Feedback deleted."))
}
