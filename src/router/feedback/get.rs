use axum::extract::{Path, State};

use crate::envelope::Envelope;
use crate::error::Result;
use crate::feedback::{Feedback, FeedbackService};

/// Feedback of every study.
pub async fn list(State(feedback): State<FeedbackService>) -> Result<Envelope<Vec<Feedback>>> {
    Ok(Envelope::ok("Feedback found.", feedback.list_all().await?))
}

/// Feedback of one study.
pub async fn handler(
    State(feedback): State<FeedbackService>,
    Path(study_id): Path<String>,
) -> Result<Envelope<Vec<Feedback>>> {
    Ok(Envelope::ok(
        "Feedback found.",
        feedback.list_by_study(&study_id).await?,
    ))
}
