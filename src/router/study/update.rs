use axum::Extension;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::create::MAX_CAPACITY;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::router::Valid;
use crate::study::{Study, StudyChanges, StudyService};

#[derive(Debug, Default, Validate, Serialize, Deserialize)]
pub struct Body {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Title must be 1 to 100 characters long."
    ))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "Description is too long."))]
    pub description: Option<String>,
    #[validate(range(
        min = 1,
        max = MAX_CAPACITY,
        message = "Capacity must be between 1 and 100."
    ))]
    pub capacity: Option<i32>,
}

/// Handler to edit study metadata. Owner only.
pub async fn handler(
    State(studies): State<StudyService>,
    Extension(study): Extension<Study>,
    Valid(body): Valid<Body>,
) -> Result<Envelope<Study>> {
    let changes = StudyChanges {
        title: body.title,
        description: body.description,
        capacity: body.capacity,
    };

    let outcome = studies.update(study, changes).await?;

    Ok(Envelope::updated("Study updated.", outcome))
}
