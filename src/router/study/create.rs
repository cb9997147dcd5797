use axum::Extension;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::envelope::Envelope;
use crate::error::Result;
use crate::middleware::Caller;
use crate::router::Valid;
use crate::study::{NewStudy, Study, StudyService};

pub const MAX_CAPACITY: i32 = 100;

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct Body {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Title must be 1 to 100 characters long."
    ))]
    pub title: String,
    #[validate(length(max = 2000, message = "Description is too long."))]
    pub description: Option<String>,
    #[validate(range(
        min = 1,
        max = MAX_CAPACITY,
        message = "Capacity must be between 1 and 100."
    ))]
    pub capacity: i32,
}

/// Handler to open a study. The caller becomes its owner.
pub async fn handler(
    State(studies): State<StudyService>,
    Extension(caller): Extension<Caller>,
    Valid(body): Valid<Body>,
) -> Result<Envelope<Study>> {
    let study = studies
        .create(
            &caller.user_id,
            NewStudy {
                title: body.title,
                description: body.description.unwrap_or_default(),
                capacity: body.capacity,
            },
        )
        .await?;

    Ok(Envelope::ok("Study created.", study))
}
