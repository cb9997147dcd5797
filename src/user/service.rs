use std::sync::Arc;

use axum::extract::FromRef;
use chrono::Utc;

use crate::AppState;
use crate::crypto::{PasswordManager, is_password_valid, object_id};
use crate::error::{Result, ServerError};
use crate::patch::{Outcome, Patch};
use crate::user::{NewUser, ProfileChanges, User, UserRepository, field};

/// User manager.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    pwd: Arc<PasswordManager>,
}

impl FromRef<AppState> for UserService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(Arc::clone(&state.db.users), Arc::clone(&state.pwd))
    }
}

impl UserService {
    /// Create a new [`UserService`].
    pub fn new(repo: Arc<dyn UserRepository>, pwd: Arc<PasswordManager>) -> Self {
        Self { repo, pwd }
    }

    /// Register a user.
    ///
    /// Hash password and normalize email.
    pub async fn sign_up(&self, new_user: NewUser) -> Result<User> {
        let user = User {
            id: object_id(),
            user_name: new_user.user_name,
            email: new_user.email.trim().to_lowercase(),
            password: self.pwd.hash_password(&new_user.password)?,
            phone_number: new_user.phone_number,
            created_at: Utc::now(),
            updated_at: None,
            ..Default::default()
        };

        self.repo.insert(&user).await?;
        tracing::info!(user_id = %user.id, "account created");

        Ok(user)
    }

    /// Check credentials and return the matching user.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let user = self
            .repo
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(ServerError::NotFound("user"))?;

        if let Err(err) = is_password_valid(&self.pwd, password, &user.password) {
            tracing::info!(user_id = %user.id, "authentication failed");
            return Err(err);
        }

        Ok(user)
    }

    /// Find a user using `id` field.
    pub async fn find_by_id(&self, id: &str) -> Result<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ServerError::NotFound("user"))
    }

    /// Apply the submitted values that differ from the stored ones.
    ///
    /// A submitted password is compared through the stored hash and only
    /// re-hashed when it is actually new.
    pub async fn update(&self, id: &str, changes: ProfileChanges) -> Result<Outcome<User>> {
        let mut user = self.find_by_id(id).await?;
        let mut patch = Patch::new();

        if let Some(password) = changes.password {
            if self.pwd.verify_password(&password, &user.password).is_err() {
                let hash = self.pwd.hash_password(&password)?;
                patch.set(field::PASSWORD, &mut user.password, Some(hash));
            }
        }
        patch.set(field::INTRO_YN, &mut user.intro_yn, changes.intro_yn);
        patch.set(field::PHONE_NUMBER, &mut user.phone_number, changes.phone_number);
        patch.set(field::FILE_KEY, &mut user.file_key, changes.file_key);
        patch.set(field::FILE_NAME, &mut user.file_name, changes.file_name);

        if patch.is_empty() {
            return Ok(Outcome::Unmodified(user));
        }

        user.updated_at = Some(Utc::now());
        self.repo.update(&user, &patch).await?;
        tracing::debug!(user_id = %user.id, fields = ?patch, "profile updated");

        Ok(Outcome::Updated(user))
    }

    /// Hard delete a user after checking their credentials.
    pub async fn delete(&self, id: &str, email: &str, password: &str) -> Result<()> {
        let user = self.find_by_id(id).await?;

        if user.email != email.trim().to_lowercase() {
            return Err(ServerError::InvalidCredentials);
        }
        is_password_valid(&self.pwd, password, &user.password)?;

        if !self.repo.delete(&user.id).await? {
            return Err(ServerError::NotFound("user"));
        }
        tracing::info!(user_id = %user.id, "account deleted");

        Ok(())
    }
}
