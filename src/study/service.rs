use std::sync::Arc;

use axum::extract::FromRef;
use chrono::Utc;

use crate::AppState;
use crate::crypto::object_id;
use crate::error::{Result, ServerError};
use crate::patch::{Outcome, Patch};
use crate::study::{
    Member, MemberStatus, NewStudy, Study, StudyChanges, StudyRepository, field,
};
use crate::user::UserRepository;

/// Study and membership manager.
#[derive(Clone)]
pub struct StudyService {
    studies: Arc<dyn StudyRepository>,
    users: Arc<dyn UserRepository>,
}

impl FromRef<AppState> for StudyService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(Arc::clone(&state.db.studies), Arc::clone(&state.db.users))
    }
}

impl StudyService {
    /// Create a new [`StudyService`].
    pub fn new(
        studies: Arc<dyn StudyRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self { studies, users }
    }

    /// Open a study. The owner becomes its first accepted member.
    pub async fn create(&self, owner_id: &str, new_study: NewStudy) -> Result<Study> {
        let owner = self
            .users
            .find_by_id(owner_id)
            .await?
            .ok_or(ServerError::NotFound("user"))?;

        let now = Utc::now();
        let study = Study {
            id: object_id(),
            owner_id: owner.id.clone(),
            title: new_study.title,
            description: new_study.description,
            capacity: new_study.capacity,
            members: vec![Member {
                user_id: owner.id,
                status: MemberStatus::Accepted,
                applied_at: now,
            }],
            created_at: now,
            updated_at: None,
        };

        self.studies.insert(&study).await?;
        tracing::info!(study_id = %study.id, owner_id = %study.owner_id, "study created");

        Ok(study)
    }

    pub async fn list(&self) -> Result<Vec<Study>> {
        self.studies.list().await
    }

    /// Find a study using `id` field.
    pub async fn find(&self, id: &str) -> Result<Study> {
        self.studies
            .find_by_id(id)
            .await?
            .ok_or(ServerError::NotFound("study"))
    }

    /// Load a study and make sure `caller` owns it.
    pub async fn authorize_owner(&self, study_id: &str, caller: &str) -> Result<Study> {
        let study = self.find(study_id).await?;

        if study.owner_id != caller {
            tracing::debug!(study_id, caller, "caller does not own the study");
            return Err(ServerError::Forbidden);
        }

        Ok(study)
    }

    /// Register a pending application of `user_id`.
    pub async fn apply(&self, study_id: &str, user_id: &str) -> Result<Study> {
        let mut study = self.find(study_id).await?;

        if study.member(user_id).is_some() {
            return Err(ServerError::Conflict("already a member of this study"));
        }
        if study.is_full() {
            return Err(ServerError::Conflict("study is full"));
        }

        let member = Member {
            user_id: user_id.to_owned(),
            status: MemberStatus::Pending,
            applied_at: Utc::now(),
        };
        if !self.studies.add_member(&study.id, &member).await? {
            return Err(ServerError::Conflict("already a member of this study"));
        }
        study.members.push(member);
        tracing::debug!(study_id, user_id, "application registered");

        Ok(study)
    }

    /// Turn a pending application into an accepted membership.
    ///
    /// `study` may be stale: storage checks the capacity while writing, and
    /// the returned study is read back after the write.
    pub async fn accept(&self, study: Study, member_id: &str) -> Result<Study> {
        if study
            .member(member_id)
            .is_none_or(|m| m.status != MemberStatus::Pending)
        {
            return Err(ServerError::NotFound("application"));
        }

        self.studies.accept_member(&study.id, member_id).await?;
        tracing::debug!(study_id = %study.id, member_id, "application accepted");

        self.find(&study.id).await
    }

    /// Apply the submitted values that differ from the stored ones.
    pub async fn update(
        &self,
        mut study: Study,
        changes: StudyChanges,
    ) -> Result<Outcome<Study>> {
        let mut patch = Patch::new();
        patch.set(field::TITLE, &mut study.title, changes.title);
        patch.set(field::DESCRIPTION, &mut study.description, changes.description);
        patch.set(field::CAPACITY, &mut study.capacity, changes.capacity);

        if patch.is_empty() {
            return Ok(Outcome::Unmodified(study));
        }
        if patch.contains(field::CAPACITY) && study.is_over_capacity() {
            return Err(ServerError::invalid_field(
                field::CAPACITY,
                "Capacity cannot be lower than the number of accepted members.",
            ));
        }

        study.updated_at = Some(Utc::now());
        self.studies.update(&study, &patch).await?;
        tracing::debug!(study_id = %study.id, fields = ?patch, "study updated");

        Ok(Outcome::Updated(study))
    }

    /// Let `user_id` withdraw from a study. The owner cannot leave.
    pub async fn leave(&self, study_id: &str, user_id: &str) -> Result<()> {
        let study = self.find(study_id).await?;

        if study.owner_id == user_id {
            return Err(ServerError::Conflict("owner cannot leave the study"));
        }
        if !self.studies.remove_member(&study.id, user_id).await? {
            return Err(ServerError::NotFound("membership"));
        }
        tracing::debug!(study_id, user_id, "member left");

        Ok(())
    }

    /// Remove a member or an applicant. The owner cannot be removed.
    pub async fn remove_member(&self, study: &Study, member_id: &str) -> Result<()> {
        if study.owner_id == member_id {
            return Err(ServerError::Conflict("owner cannot be removed from the study"));
        }
        if !self.studies.remove_member(&study.id, member_id).await? {
            return Err(ServerError::NotFound("member"));
        }
        tracing::debug!(study_id = %study.id, member_id, "member removed");

        Ok(())
    }

    /// Delete a study with its members and feedback.
    pub async fn delete(&self, study: &Study) -> Result<()> {
        if !self.studies.delete(&study.id).await? {
            return Err(ServerError::NotFound("study"));
        }
        tracing::info!(study_id = %study.id, "study deleted");

        Ok(())
    }
}
