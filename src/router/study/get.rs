use axum::extract::{Path, State};

use crate::envelope::Envelope;
use crate::error::Result;
use crate::study::{Study, StudyService};

/// Every study.
pub async fn list(State(studies): State<StudyService>) -> Result<Envelope<Vec<Study>>> {
    Ok(Envelope::ok("Studies found.", studies.list().await?))
}

/// One study with its members.
pub async fn handler(
    State(studies): State<StudyService>,
    Path(study_id): Path<String>,
) -> Result<Envelope<Study>> {
    Ok(Envelope::ok("Study found.", studies.find(&study_id).await?))
}
