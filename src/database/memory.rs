//! In-process storage backend.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::community::{self, Post, PostRepository};
use crate::error::{Result, ServerError};
use crate::feedback::{self, Feedback, FeedbackRepository};
use crate::patch::Patch;
use crate::study::{self, Member, MemberStatus, Study, StudyRepository};
use crate::user::{self, User, UserRepository};

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    studies: Vec<Study>,
    feedback: Vec<Feedback>,
    posts: Vec<Post>,
}

/// Records kept in memory, in insertion order.
///
/// Every check-then-write runs under a single write lock, so uniqueness
/// holds the same way a storage constraint would.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

fn position<T>(records: &[T], matches: impl Fn(&T) -> bool) -> Option<usize> {
    records.iter().position(matches)
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> Result<()> {
        let mut db = self.inner.write().await;
        if db.users.iter().any(|u| u.email == user.email) {
            return Err(ServerError::DuplicateEmail);
        }

        db.users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let db = self.inner.read().await;
        Ok(db.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let db = self.inner.read().await;
        Ok(db.users.iter().find(|u| u.email == email).cloned())
    }

    async fn update(&self, user: &User, patch: &Patch) -> Result<()> {
        let mut db = self.inner.write().await;
        let stored = db
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(ServerError::NotFound("user"))?;

        stored.updated_at = user.updated_at;
        for name in patch.fields() {
            match name {
                user::field::PASSWORD => stored.password.clone_from(&user.password),
                user::field::INTRO_YN => stored.intro_yn = user.intro_yn,
                user::field::PHONE_NUMBER => {
                    stored.phone_number.clone_from(&user.phone_number)
                },
                user::field::FILE_KEY => stored.file_key.clone_from(&user.file_key),
                user::field::FILE_NAME => stored.file_name.clone_from(&user.file_name),
                other => tracing::warn!(field = other, "unknown user column ignored"),
            }
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut db = self.inner.write().await;
        let Some(index) = position(&db.users, |u| u.id == id) else {
            return Ok(false);
        };
        db.users.remove(index);

        let owned: Vec<String> = db
            .studies
            .iter()
            .filter(|s| s.owner_id == id)
            .map(|s| s.id.clone())
            .collect();
        db.studies.retain(|s| s.owner_id != id);
        db.feedback.retain(|f| !owned.contains(&f.study_id));
        for study in &mut db.studies {
            study.members.retain(|m| m.user_id != id);
        }

        Ok(true)
    }
}

#[async_trait]
impl StudyRepository for MemoryStore {
    async fn insert(&self, study: &Study) -> Result<()> {
        let mut db = self.inner.write().await;
        if db.studies.iter().any(|s| s.id == study.id) {
            return Err(ServerError::Conflict("study already exists"));
        }

        db.studies.push(study.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Study>> {
        let db = self.inner.read().await;
        Ok(db.studies.iter().find(|s| s.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Study>> {
        let db = self.inner.read().await;
        let mut studies = db.studies.clone();
        studies.sort_by_key(|s| s.created_at);

        Ok(studies)
    }

    async fn update(&self, study: &Study, patch: &Patch) -> Result<()> {
        let mut db = self.inner.write().await;
        let stored = db
            .studies
            .iter_mut()
            .find(|s| s.id == study.id)
            .ok_or(ServerError::NotFound("study"))?;

        stored.updated_at = study.updated_at;
        for name in patch.fields() {
            match name {
                study::field::TITLE => stored.title.clone_from(&study.title),
                study::field::DESCRIPTION => {
                    stored.description.clone_from(&study.description)
                },
                study::field::CAPACITY => stored.capacity = study.capacity,
                other => tracing::warn!(field = other, "unknown study column ignored"),
            }
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut db = self.inner.write().await;
        let Some(index) = position(&db.studies, |s| s.id == id) else {
            return Ok(false);
        };
        db.studies.remove(index);
        db.feedback.retain(|f| f.study_id != id);

        Ok(true)
    }

    async fn add_member(&self, study_id: &str, member: &Member) -> Result<bool> {
        let mut db = self.inner.write().await;
        let study = db
            .studies
            .iter_mut()
            .find(|s| s.id == study_id)
            .ok_or(ServerError::NotFound("study"))?;

        if study.member(&member.user_id).is_some() {
            return Ok(false);
        }
        study.members.push(member.clone());

        Ok(true)
    }

    async fn accept_member(&self, study_id: &str, user_id: &str) -> Result<()> {
        let mut db = self.inner.write().await;
        let study = db
            .studies
            .iter_mut()
            .find(|s| s.id == study_id)
            .ok_or(ServerError::NotFound("study"))?;

        if study.is_full() {
            return Err(ServerError::Conflict("study is full"));
        }
        let member = study
            .members
            .iter_mut()
            .find(|m| m.user_id == user_id && m.status == MemberStatus::Pending)
            .ok_or(ServerError::NotFound("application"))?;
        member.status = MemberStatus::Accepted;

        Ok(())
    }

    async fn remove_member(&self, study_id: &str, user_id: &str) -> Result<bool> {
        let mut db = self.inner.write().await;
        let Some(study) = db.studies.iter_mut().find(|s| s.id == study_id) else {
            return Ok(false);
        };

        let before = study.members.len();
        study.members.retain(|m| m.user_id != user_id);

        Ok(study.members.len() != before)
    }
}

#[async_trait]
impl FeedbackRepository for MemoryStore {
    async fn insert(&self, feedback: &Feedback) -> Result<()> {
        let mut db = self.inner.write().await;
        if !db.studies.iter().any(|s| s.id == feedback.study_id) {
            return Err(ServerError::NotFound("study"));
        }

        db.feedback.push(feedback.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Feedback>> {
        let db = self.inner.read().await;
        Ok(db.feedback.iter().find(|f| f.id == id).cloned())
    }

    async fn list_by_study(&self, study_id: &str) -> Result<Vec<Feedback>> {
        let db = self.inner.read().await;
        let mut entries: Vec<Feedback> = db
            .feedback
            .iter()
            .filter(|f| f.study_id == study_id)
            .cloned()
            .collect();
        entries.sort_by_key(|f| f.created_at);

        Ok(entries)
    }

    async fn list_all(&self) -> Result<Vec<Feedback>> {
        let db = self.inner.read().await;
        let mut entries = db.feedback.clone();
        entries.sort_by_key(|f| f.created_at);

        Ok(entries)
    }

    async fn update(&self, feedback: &Feedback, patch: &Patch) -> Result<()> {
        let mut db = self.inner.write().await;
        let stored = db
            .feedback
            .iter_mut()
            .find(|f| f.id == feedback.id)
            .ok_or(ServerError::NotFound("feedback"))?;

        stored.updated_at = feedback.updated_at;
        for name in patch.fields() {
            match name {
                feedback::field::CONTENT => stored.content.clone_from(&feedback.content),
                feedback::field::CONTENT_TYPE => stored.content_type = feedback.content_type,
                other => tracing::warn!(field = other, "unknown feedback column ignored"),
            }
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut db = self.inner.write().await;
        let before = db.feedback.len();
        db.feedback.retain(|f| f.id != id);

        Ok(db.feedback.len() != before)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn insert(&self, post: &Post) -> Result<()> {
        self.inner.write().await.posts.push(post.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>> {
        let db = self.inner.read().await;
        Ok(db.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Post>> {
        let db = self.inner.read().await;
        let mut posts = db.posts.clone();
        posts.reverse();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(posts)
    }

    async fn update(&self, post: &Post, patch: &Patch) -> Result<()> {
        let mut db = self.inner.write().await;
        let stored = db
            .posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(ServerError::NotFound("post"))?;

        stored.updated_at = post.updated_at;
        for name in patch.fields() {
            match name {
                community::field::TITLE => stored.title.clone_from(&post.title),
                community::field::CONTENT => stored.content.clone_from(&post.content),
                other => tracing::warn!(field = other, "unknown post column ignored"),
            }
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut db = self.inner.write().await;
        let before = db.posts.len();
        db.posts.retain(|p| p.id != id);

        Ok(db.posts.len() != before)
    }
}
