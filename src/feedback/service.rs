use std::sync::Arc;

use axum::extract::FromRef;
use chrono::Utc;

use crate::AppState;
use crate::crypto::object_id;
use crate::error::{Result, ServerError};
use crate::feedback::{Feedback, FeedbackChanges, FeedbackRepository, NewFeedback, field};
use crate::patch::{Outcome, Patch};
use crate::study::StudyRepository;
use crate::user::UserRepository;

/// Study feedback manager.
#[derive(Clone)]
pub struct FeedbackService {
    feedback: Arc<dyn FeedbackRepository>,
    studies: Arc<dyn StudyRepository>,
    users: Arc<dyn UserRepository>,
}

impl FromRef<AppState> for FeedbackService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.db.feedback),
            Arc::clone(&state.db.studies),
            Arc::clone(&state.db.users),
        )
    }
}

impl FeedbackService {
    /// Create a new [`FeedbackService`].
    pub fn new(
        feedback: Arc<dyn FeedbackRepository>,
        studies: Arc<dyn StudyRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            feedback,
            studies,
            users,
        }
    }

    /// Post feedback in a study. Only accepted members may write.
    pub async fn create(&self, author_id: &str, new_feedback: NewFeedback) -> Result<Feedback> {
        let study = self
            .studies
            .find_by_id(&new_feedback.study_id)
            .await?
            .ok_or(ServerError::NotFound("study"))?;
        if !study.is_accepted(author_id) {
            return Err(ServerError::Forbidden);
        }

        let author = self
            .users
            .find_by_id(author_id)
            .await?
            .ok_or(ServerError::NotFound("user"))?;

        let feedback = Feedback {
            id: object_id(),
            study_id: study.id,
            user_id: author.id,
            user_name: author.user_name,
            content_type: new_feedback.content_type,
            content: new_feedback.content,
            created_at: Utc::now(),
            updated_at: None,
        };

        self.feedback.insert(&feedback).await?;
        tracing::debug!(feedback_id = %feedback.id, study_id = %feedback.study_id, "feedback posted");

        Ok(feedback)
    }

    /// Feedback of one study.
    pub async fn list_by_study(&self, study_id: &str) -> Result<Vec<Feedback>> {
        if self.studies.find_by_id(study_id).await?.is_none() {
            return Err(ServerError::NotFound("study"));
        }

        self.feedback.list_by_study(study_id).await
    }

    pub async fn list_all(&self) -> Result<Vec<Feedback>> {
        self.feedback.list_all().await
    }

    /// Find a feedback entry using `id` field.
    pub async fn find(&self, id: &str) -> Result<Feedback> {
        self.feedback
            .find_by_id(id)
            .await?
            .ok_or(ServerError::NotFound("feedback"))
    }

    /// Apply the submitted values that differ from the stored ones.
    /// Only the author may edit an entry.
    pub async fn update(
        &self,
        caller: &str,
        feedback_id: &str,
        changes: FeedbackChanges,
    ) -> Result<Outcome<Feedback>> {
        let mut feedback = self.find(feedback_id).await?;
        if feedback.user_id != caller {
            return Err(ServerError::Forbidden);
        }

        let mut patch = Patch::new();
        patch.set(field::CONTENT, &mut feedback.content, changes.content);
        patch.set(field::CONTENT_TYPE, &mut feedback.content_type, changes.content_type);

        if patch.is_empty() {
            return Ok(Outcome::Unmodified(feedback));
        }

        feedback.updated_at = Some(Utc::now());
        self.feedback.update(&feedback, &patch).await?;
        tracing::debug!(feedback_id = %feedback.id, fields = ?patch, "feedback updated");

        Ok(Outcome::Updated(feedback))
    }

    /// Delete an entry of `study_id`. The author and the study owner may
    /// delete it.
    pub async fn delete(&self, study_id: &str, feedback_id: &str, caller: &str) -> Result<()> {
        let feedback = self.find(feedback_id).await?;
        if feedback.study_id != study_id {
            return Err(ServerError::NotFound("feedback"));
        }

        if feedback.user_id != caller {
            let owns_study = self
                .studies
                .find_by_id(study_id)
                .await?
                .is_some_and(|study| study.owner_id == caller);
            if !owns_study {
                return Err(ServerError::Forbidden);
            }
        }

        if !self.feedback.delete(&feedback.id).await? {
            return Err(ServerError::NotFound("feedback"));
        }
        tracing::debug!(feedback_id, study_id, "feedback deleted");

        Ok(())
    }
}
